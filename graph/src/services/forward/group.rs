//! Forwards grouped by the channel they entered or left through.

use super::transform::ForwardRecord;
use crate::services::graph::transform::ChannelRecord;
use crate::utils::{EntityKind, entity_key};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Which side of a forward decides its group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    #[default]
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(Direction::In),
            "" | "out" => Ok(Direction::Out),
            other => Err(format!("Unknown forwards direction: {other}")),
        }
    }
}

/// Millisatoshi totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Sums {
    pub amount: u64,
    pub fee: u64,
}

/// Millisatoshi means over the forwards of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Averages {
    pub amount: f64,
    pub fee: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub count: usize,
    pub sums: Sums,
    pub averages: Averages,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardsGroupRecord {
    pub key: String,
    pub direction: Direction,
    pub last_at: Option<DateTime<Utc>>,
    pub analysis: Analysis,
    pub channel: ChannelRecord,
}

/// Groups `forwards` by the channel on the `direction` side. Amounts are the
/// ones that crossed that channel. Groups come back most recently active first.
pub fn group_by_channel(
    forwards: &[ForwardRecord],
    direction: Direction,
) -> Vec<ForwardsGroupRecord> {
    let mut groups: HashMap<&str, ForwardsGroupRecord> = HashMap::new();

    for forward in forwards {
        let side = match direction {
            Direction::In => &forward.incoming,
            Direction::Out => &forward.outgoing,
        };

        let group = groups.entry(side.channel.key()).or_insert_with(|| {
            let discriminator = format!("{}:{}", direction.as_str(), side.channel.key());
            ForwardsGroupRecord {
                key: entity_key(EntityKind::ForwardsGroup, &discriminator),
                direction,
                last_at: None,
                analysis: Analysis::default(),
                channel: side.channel.clone(),
            }
        });

        group.analysis.count += 1;
        group.analysis.sums.amount = group.analysis.sums.amount.saturating_add(side.amount);
        group.analysis.sums.fee = group.analysis.sums.fee.saturating_add(forward.fee);
        group.last_at = group.last_at.max(forward.at);
    }

    let mut groups: Vec<ForwardsGroupRecord> = groups
        .into_values()
        .map(|mut group| {
            let count = group.analysis.count as f64;
            group.analysis.averages = Averages {
                amount: group.analysis.sums.amount as f64 / count,
                fee: group.analysis.sums.fee as f64 / count,
            };
            group
        })
        .collect();

    groups.sort_by(|a, b| b.last_at.cmp(&a.last_at).then_with(|| a.key.cmp(&b.key)));
    groups
}
