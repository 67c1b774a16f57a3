//! Normalizes the channel and node side of a pass.

use super::fetch::RawGraph;
use crate::adapters::{self, ChannelData, FeeReportEntry, LocalNodeData, NodeData};
use crate::utils::ShortChannelID;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Channels and nodes after every raw value went through its adapter.
///
/// Failed lookups are absent here; nothing downstream sees an error marker.
#[derive(Debug, Clone)]
pub struct AdaptedGraph {
    pub at: DateTime<Utc>,
    pub local: LocalNodeData,
    pub fee_report: HashMap<ShortChannelID, FeeReportEntry>,
    pub channels: HashMap<ShortChannelID, ChannelData>,
    pub local_channels: HashMap<ShortChannelID, ChannelData>,
    pub nodes: HashMap<String, NodeData>,
}

pub fn adapt(raw: &RawGraph) -> AdaptedGraph {
    let at = raw.local.at;
    let local_public_key = raw.local.public_key();

    AdaptedGraph {
        at,
        local: adapters::node::get_info(&raw.local.get_info),
        fee_report: raw
            .local
            .fee_report
            .channel_fees
            .iter()
            .map(adapters::fee::fee_report)
            .map(|entry| (entry.channel_id, entry))
            .collect(),
        channels: raw
            .get_chan_info
            .iter()
            .filter_map(|(id, edge)| {
                let edge = edge.as_ref().ok()?;
                Some((*id, adapters::channel::get_chan_info(edge)))
            })
            .collect(),
        local_channels: raw
            .list_channels
            .iter()
            .map(|(id, channel)| {
                (
                    *id,
                    adapters::channel::list_channels(channel, at, local_public_key),
                )
            })
            .collect(),
        nodes: raw
            .get_node_info
            .iter()
            .map(|(public_key, info)| {
                (
                    public_key.clone(),
                    adapters::node::get_node_info(info, public_key),
                )
            })
            .collect(),
    }
}
