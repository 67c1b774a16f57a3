//! Views over routed payments and their per-channel groups.

use super::channel::Channel;
use super::satoshis::Satoshis;
use crate::services::forward::group::{Direction, ForwardsGroupRecord};
use crate::services::forward::transform::{ForwardChannelRecord, ForwardRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct ForwardChannel<'a> {
    record: &'a ForwardChannelRecord,
}

impl<'a> ForwardChannel<'a> {
    pub fn amount(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.amount)
    }

    pub fn channel(&self) -> Channel<'a> {
        Channel::new(&self.record.channel)
    }
}

/// A payment the local node routed between two of its channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Forward {
    record: ForwardRecord,
}

impl Forward {
    pub fn new(record: ForwardRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &ForwardRecord {
        &self.record
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        self.record.at
    }

    pub fn fee(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.fee)
    }

    /// Fee in parts per million of the incoming amount.
    pub fn fee_rate(&self) -> f64 {
        self.record.fee_rate
    }

    pub fn incoming(&self) -> ForwardChannel<'_> {
        ForwardChannel {
            record: &self.record.incoming,
        }
    }

    pub fn outgoing(&self) -> ForwardChannel<'_> {
        ForwardChannel {
            record: &self.record.outgoing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForwardsGroup {
    record: ForwardsGroupRecord,
}

impl ForwardsGroup {
    pub fn new(record: ForwardsGroupRecord) -> Self {
        Self { record }
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn direction(&self) -> Direction {
        self.record.direction
    }

    pub fn last_at(&self) -> Option<DateTime<Utc>> {
        self.record.last_at
    }

    pub fn count(&self) -> usize {
        self.record.analysis.count
    }

    pub fn total_amount(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.analysis.sums.amount)
    }

    pub fn total_fee(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.analysis.sums.fee)
    }

    /// Mean amount per forward, in millisatoshis.
    pub fn average_amount(&self) -> f64 {
        self.record.analysis.averages.amount
    }

    /// Mean fee per forward, in millisatoshis.
    pub fn average_fee(&self) -> f64 {
        self.record.analysis.averages.fee
    }

    pub fn channel(&self) -> Channel<'_> {
        Channel::new(&self.record.channel)
    }
}
