//! Forwarding history and the channels it routed through.

use crate::errors::LightningError;
use crate::services::graph;
use crate::services::graph::fetch::RawGraph;
use crate::services::node_manager::LightningClient;
use crate::services::raw::RawForwardingEvent;
use crate::utils::ShortChannelID;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug)]
pub struct RawSnapshot {
    pub forwarding_history: Vec<RawForwardingEvent>,
    pub graph: RawGraph,
}

/// Pages through `forwarding_history` from `since` onwards and keeps the
/// newest `limit` events.
pub async fn fetch_forwards<C: LightningClient + ?Sized>(
    client: &C,
    since: Option<DateTime<Utc>>,
    limit: Option<usize>,
) -> Result<Vec<RawForwardingEvent>, LightningError> {
    let start_time = since
        .and_then(|since| u64::try_from(since.timestamp()).ok())
        .unwrap_or_default();

    let mut last_offset = 0;
    let mut forwards = Vec::new();

    loop {
        let page = client.forwarding_history(last_offset, start_time).await?;
        debug!(
            "forwarding_history page at offset {} returned {} events",
            last_offset,
            page.forwarding_events.len()
        );

        if page.forwarding_events.is_empty() {
            break;
        }
        forwards.extend(page.forwarding_events);

        if page.last_offset_index <= last_offset {
            break;
        }
        last_offset = page.last_offset_index;
    }

    forwards.sort_by_key(|forward| Reverse(forward.timestamp_ns));
    if let Some(limit) = limit {
        forwards.truncate(limit);
    }

    Ok(forwards)
}

pub async fn fetch<C: LightningClient + ?Sized>(
    client: &C,
    since: Option<DateTime<Utc>>,
    limit: Option<usize>,
) -> Result<RawSnapshot, LightningError> {
    let local = graph::fetch::fetch_local(client).await?;
    let forwarding_history = fetch_forwards(client, since, limit).await?;

    let channel_ids: BTreeSet<ShortChannelID> = forwarding_history
        .iter()
        .flat_map(|forward| [forward.chan_id_in, forward.chan_id_out])
        .map(ShortChannelID)
        .collect();

    let graph = graph::fetch::resolve(client, local, channel_ids, BTreeSet::new()).await?;
    info!("Fetched {} forwards", forwarding_history.len());

    Ok(RawSnapshot {
        forwarding_history,
        graph,
    })
}
