//! Payments the local node routed, stitched against the channels they
//! entered and left through.
//!
//! The pass mirrors the payments pass: [`fetch::fetch`] pages through the
//! forwarding history and resolves both channels of every forward,
//! [`adapt::adapt`] normalizes, [`transform::transform`] stitches. The
//! grouping in [`group`] works on stitched records.

pub mod adapt;
pub mod fetch;
pub mod group;
pub mod transform;

use crate::errors::LightningError;
use crate::models::{Forward, ForwardsGroup};
use crate::services::node_manager::LightningClient;
use chrono::{DateTime, TimeDelta, Utc};
use group::Direction;
use transform::ForwardRecord;

/// Runs one forwards pass over the events since `since`, newest first.
pub async fn data<C: LightningClient + ?Sized>(
    client: &C,
    since: Option<DateTime<Utc>>,
    limit: Option<usize>,
) -> Result<Vec<ForwardRecord>, LightningError> {
    let raw = fetch::fetch(client, since, limit).await?;
    let adapted = adapt::adapt(&raw);

    Ok(adapted
        .forwards
        .iter()
        .map(|forward| transform::transform(forward, &adapted.graph))
        .collect())
}

pub fn model(records: Vec<ForwardRecord>) -> Vec<Forward> {
    records.into_iter().map(Forward::new).collect()
}

pub async fn all<C: LightningClient + ?Sized>(
    client: &C,
    limit: Option<usize>,
) -> Result<Vec<Forward>, LightningError> {
    Ok(model(data(client, None, limit).await?))
}

/// Groups every forward of the last `hours_ago` hours by channel and keeps the
/// `limit` most recently active groups.
pub async fn group_by_channel<C: LightningClient + ?Sized>(
    client: &C,
    direction: Direction,
    hours_ago: Option<u32>,
    limit: Option<usize>,
) -> Result<Vec<ForwardsGroup>, LightningError> {
    let since = hours_ago
        .map(|hours| {
            TimeDelta::try_hours(i64::from(hours))
                .and_then(|delta| Utc::now().checked_sub_signed(delta))
                .ok_or_else(|| {
                    LightningError::ValidationError(format!("Invalid time window: {hours} hours"))
                })
        })
        .transpose()?;

    let records = data(client, since, None).await?;
    let mut groups = group::group_by_channel(&records, direction);
    if let Some(limit) = limit {
        groups.truncate(limit);
    }

    Ok(groups.into_iter().map(ForwardsGroup::new).collect())
}
