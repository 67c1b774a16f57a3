//! Node identity adapters for `get_info` and `get_node_info`.

use super::{ChainData, LightningData, LocalNodeData, NodeData, PlatformData};
use crate::services::raw::{RawGetInfo, RawNodeInfo};
use crate::utils::non_empty;

pub const IMPLEMENTATION: &str = "lnd";

pub fn get_info(raw: &RawGetInfo) -> LocalNodeData {
    let chain = raw
        .chains
        .first()
        .map(|chain| ChainData {
            blockchain: chain.chain.clone(),
            network: chain.network.clone(),
        })
        .unwrap_or_else(|| ChainData {
            blockchain: String::new(),
            network: String::new(),
        });

    LocalNodeData {
        node: NodeData {
            public_key: raw.identity_pubkey.clone(),
            alias: non_empty(&raw.alias),
            color: non_empty(&raw.color),
        },
        platform: PlatformData {
            chain,
            lightning: LightningData {
                implementation: IMPLEMENTATION.to_string(),
                version: raw.version.clone(),
            },
        },
    }
}

/// `public_key` is the lookup key, used when the node record itself is absent.
pub fn get_node_info(raw: &RawNodeInfo, public_key: &str) -> NodeData {
    match &raw.node {
        Some(node) => NodeData {
            public_key: non_empty(&node.pub_key).unwrap_or_else(|| public_key.to_string()),
            alias: non_empty(&node.alias),
            color: non_empty(&node.color),
        },
        None => NodeData {
            public_key: public_key.to_string(),
            ..Default::default()
        },
    }
}
