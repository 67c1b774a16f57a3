//! Deduplicated channel and node lookups.
//!
//! Lookups run in three phases. Within a phase every key set is computed and
//! fixed before anything is dispatched, each key gets exactly one call, and
//! the calls run concurrently. A phase only starts once the phase that
//! discovers its keys has completed.

use crate::errors::LightningError;
use crate::services::node_manager::LightningClient;
use crate::services::raw::{
    RawChannelEdge, RawFeeReport, RawGetInfo, RawLocalChannel, RawNodeInfo,
};
use crate::utils::ShortChannelID;
use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::hash::Hash;
use tracing::{info, warn};

/// Outcome of a lookup that is allowed to fail for a single key.
pub type Lookup<T> = Result<T, LightningError>;

/// The local node's view, taken once at the start of a pass.
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    pub at: DateTime<Utc>,
    pub get_info: RawGetInfo,
    pub fee_report: RawFeeReport,
}

impl LocalSnapshot {
    pub fn public_key(&self) -> &str {
        &self.get_info.identity_pubkey
    }
}

/// Everything the node said about the channels and nodes of one pass.
#[derive(Debug)]
pub struct RawGraph {
    pub local: LocalSnapshot,
    pub get_chan_info: HashMap<ShortChannelID, Lookup<RawChannelEdge>>,
    /// Keyed by public key.
    pub get_node_info: HashMap<String, RawNodeInfo>,
    pub list_channels: HashMap<ShortChannelID, RawLocalChannel>,
}

/// Issues one call per key concurrently and records each outcome in its own slot.
pub async fn lookup_each<K, T, F, Fut>(keys: BTreeSet<K>, lookup: F) -> HashMap<K, Lookup<T>>
where
    K: Ord + Hash + Clone,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Lookup<T>>,
{
    let results = join_all(keys.iter().cloned().map(lookup)).await;
    keys.into_iter().zip(results).collect()
}

/// Node identity is essential, so any failure aborts the pass.
async fn lookup_nodes<C: LightningClient + ?Sized>(
    client: &C,
    keys: BTreeSet<String>,
) -> Result<HashMap<String, RawNodeInfo>, LightningError> {
    let infos = try_join_all(keys.iter().map(|key| client.get_node_info(key))).await?;
    Ok(keys.into_iter().zip(infos).collect())
}

pub fn log_failures<K: std::fmt::Display, T>(method: &str, lookups: &HashMap<K, Lookup<T>>) {
    for (key, lookup) in lookups {
        if let Err(err) = lookup {
            warn!("{} failed for {}: {}", method, key, err);
        }
    }
}

pub async fn fetch_local<C: LightningClient + ?Sized>(
    client: &C,
) -> Result<LocalSnapshot, LightningError> {
    let at = Utc::now();
    let (get_info, fee_report) = futures::try_join!(client.get_info(), client.fee_report())?;
    Ok(LocalSnapshot {
        at,
        get_info,
        fee_report,
    })
}

/// Resolves `channel_ids` and `node_keys`, then the partners of every resolved
/// channel and, for our own channels, the local channel list entries and
/// their remote partners.
pub async fn resolve<C: LightningClient + ?Sized>(
    client: &C,
    local: LocalSnapshot,
    channel_ids: BTreeSet<ShortChannelID>,
    node_keys: BTreeSet<String>,
) -> Result<RawGraph, LightningError> {
    let local_public_key = local.public_key().to_string();

    // Phase 1: what the primary records reference directly.
    let (get_chan_info, get_node_info) = futures::join!(
        lookup_each(channel_ids, move |id: ShortChannelID| async move {
            client.get_chan_info(id.to_u64()).await
        }),
        lookup_nodes(client, node_keys),
    );
    let mut get_node_info = get_node_info?;

    // Phase 2: resolved channels reveal which ones are ours and who their partners are.
    let mut peers = BTreeSet::new();
    let mut partner_keys = BTreeSet::new();
    for edge in get_chan_info.values().filter_map(|edge| edge.as_ref().ok()) {
        let partners = [&edge.node1_pub, &edge.node2_pub];
        if partners.contains(&&local_public_key) {
            if let Some(remote) = partners.into_iter().find(|key| **key != local_public_key) {
                peers.insert(remote.clone());
            }
        }
        for key in partners {
            if !key.is_empty() && !get_node_info.contains_key(key) {
                partner_keys.insert(key.clone());
            }
        }
    }

    let (local_channels, partner_infos) = futures::join!(
        try_join_all(peers.iter().map(|peer| client.list_channels(peer))),
        lookup_nodes(client, partner_keys),
    );
    get_node_info.extend(partner_infos?);

    let list_channels: HashMap<ShortChannelID, RawLocalChannel> = local_channels?
        .into_iter()
        .flatten()
        .map(|channel| (ShortChannelID(channel.chan_id), channel))
        .collect();

    // Phase 3: remote partners of our own channels.
    let remote_keys: BTreeSet<String> = list_channels
        .values()
        .map(|channel| channel.remote_pubkey.clone())
        .filter(|key| !key.is_empty() && !get_node_info.contains_key(key))
        .collect();
    get_node_info.extend(lookup_nodes(client, remote_keys).await?);

    log_failures("get_chan_info", &get_chan_info);
    info!(
        "Resolved {} channels, {} nodes and {} local channels",
        get_chan_info.len(),
        get_node_info.len(),
        list_channels.len()
    );

    Ok(RawGraph {
        local,
        get_chan_info,
        get_node_info,
        list_channels,
    })
}
