//! Stitches adapted forwards against the channels they used.

use crate::adapters::{ForwardChannelData, ForwardData};
use crate::models::Satoshis;
use crate::services::graph::adapt::AdaptedGraph;
use crate::services::graph::transform::{ChannelRecord, transform_channel};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardChannelRecord {
    pub amount: u64,
    pub channel: ChannelRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardRecord {
    pub key: String,
    pub at: Option<DateTime<Utc>>,
    pub fee: u64,
    /// Fee in parts per million of the incoming amount.
    pub fee_rate: f64,
    #[serde(rename = "in")]
    pub incoming: ForwardChannelRecord,
    #[serde(rename = "out")]
    pub outgoing: ForwardChannelRecord,
}

fn transform_side(side: &ForwardChannelData, graph: &AdaptedGraph) -> ForwardChannelRecord {
    ForwardChannelRecord {
        amount: side.amount,
        channel: transform_channel(&side.channel, graph),
    }
}

pub fn transform(forward: &ForwardData, graph: &AdaptedGraph) -> ForwardRecord {
    let fee_rate = Satoshis::from_millisatoshis(forward.fee)
        .parts_per_million(Satoshis::from_millisatoshis(forward.incoming.amount));

    ForwardRecord {
        key: forward.key.clone(),
        at: forward.at,
        fee: forward.fee,
        fee_rate,
        incoming: transform_side(&forward.incoming, graph),
        outgoing: transform_side(&forward.outgoing, graph),
    }
}
