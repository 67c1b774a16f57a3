//! Node and channel records, stitched from every view a pass gathered.

use super::adapt::AdaptedGraph;
use crate::adapters::merge::FillGaps;
use crate::adapters::{
    ChainData, ChannelAccounting, ChannelData, NodeData, PartnerAccounting, PartnerData,
    PlatformData, PolicyData,
};
use crate::utils::{ChannelState, EntityKind, Exposure, ShortChannelID, entity_key};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalNode {
    pub key: String,
    #[serde(flatten)]
    pub node: NodeData,
    pub platform: PlatformData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteNode {
    pub key: String,
    #[serde(flatten)]
    pub node: NodeData,
    /// Counterparties share the local node's chain; nothing else about their
    /// platform is known.
    pub chain: ChainData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRecord {
    Local(LocalNode),
    Remote(RemoteNode),
}

impl NodeRecord {
    pub fn key(&self) -> &str {
        match self {
            NodeRecord::Local(node) => &node.key,
            NodeRecord::Remote(node) => &node.key,
        }
    }

    pub fn data(&self) -> &NodeData {
        match self {
            NodeRecord::Local(node) => &node.node,
            NodeRecord::Remote(node) => &node.node,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, NodeRecord::Local(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerRecord {
    pub node: NodeRecord,
    pub policy: Option<PolicyData>,
    pub accounting: Option<PartnerAccounting>,
    pub initiator: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnownChannel {
    pub key: String,
    pub id: ShortChannelID,
    pub point: Option<String>,
    pub mine: bool,
    pub target: Option<String>,
    pub opened_at: Option<DateTime<Utc>>,
    pub up_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub state: Option<ChannelState>,
    pub exposure: Option<Exposure>,
    pub accounting: Option<ChannelAccounting>,
    pub partners: Vec<PartnerRecord>,
}

/// A channel the node has no record of, typically one that has closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownChannel {
    pub key: String,
    pub id: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelRecord {
    Known(Box<KnownChannel>),
    Unknown(UnknownChannel),
}

impl ChannelRecord {
    pub fn key(&self) -> &str {
        match self {
            ChannelRecord::Known(channel) => &channel.key,
            ChannelRecord::Unknown(channel) => &channel.key,
        }
    }
}

pub fn node_record(public_key: &str, graph: &AdaptedGraph) -> NodeRecord {
    let key = entity_key(EntityKind::Node, public_key);

    if public_key == graph.local.node.public_key {
        return NodeRecord::Local(LocalNode {
            key,
            node: graph.local.node.clone(),
            platform: graph.local.platform.clone(),
        });
    }

    NodeRecord::Remote(RemoteNode {
        key,
        node: graph
            .nodes
            .get(public_key)
            .cloned()
            .unwrap_or_else(|| NodeData {
                public_key: public_key.to_string(),
                ..Default::default()
            }),
        chain: graph.local.platform.chain.clone(),
    })
}

/// Gives slot `index` the policy of the last same-key partner that has one.
fn cross_copy_policy(partners: &mut [PartnerData], index: usize) {
    let Some(public_key) = partners[index].public_key.clone() else {
        return;
    };
    let policy = partners
        .iter()
        .rev()
        .filter(|partner| partner.public_key.as_deref() == Some(public_key.as_str()))
        .find_map(|partner| partner.policy.clone());
    if policy.is_some() {
        partners[index].policy = policy;
    }
}

/// Resolves a channel stub against everything the pass learned.
///
/// Gossip replaces the stub but keeps its `target`. Local channel list
/// entries fill gaps on the partner with the same public key: gossip orders
/// partners node1/node2 while the list puts the remote side first, so slot
/// positions do not line up.
pub fn transform_channel(stub: &ChannelData, graph: &AdaptedGraph) -> ChannelRecord {
    let id = stub.short_channel_id();
    let local_public_key = graph.local.node.public_key.as_str();

    let mut data = match id.and_then(|id| graph.channels.get(&id)) {
        Some(gossip) => ChannelData {
            target: stub.target.clone(),
            known: true,
            ..gossip.clone()
        },
        None => stub.clone(),
    };

    if data.partners.len() == 1 {
        data.mine = true;
    }

    for index in 0..data.partners.len().min(2) {
        cross_copy_policy(&mut data.partners, index);

        if data.partners[index].public_key.as_deref() != Some(local_public_key) {
            continue;
        }
        data.mine = true;

        // The fee report is fresher than gossip for our own side.
        if let Some(entry) = id.and_then(|id| graph.fee_report.get(&id)) {
            data.partners[index]
                .policy
                .get_or_insert_with(PolicyData::default)
                .fee = Some(entry.fee.clone());
        }
    }

    if let Some(local) = id.and_then(|id| graph.local_channels.get(&id)) {
        data.fill_gaps(local);
        for partner in &local.partners {
            if let Some(slot) = data
                .partners
                .iter_mut()
                .find(|slot| slot.public_key.is_some() && slot.public_key == partner.public_key)
            {
                slot.fill_gaps(partner);
            }
        }
    }

    let key = entity_key(EntityKind::Channel, &data.id);
    match id {
        Some(id) if data.known => ChannelRecord::Known(Box::new(KnownChannel {
            key,
            id,
            point: data.point,
            mine: data.mine,
            target: data.target,
            opened_at: data.opened_at,
            up_at: data.up_at,
            updated_at: data.updated_at,
            state: data.state,
            exposure: data.exposure,
            accounting: data.accounting,
            partners: data
                .partners
                .into_iter()
                .take(2)
                .filter_map(|partner| {
                    let node = node_record(partner.public_key.as_deref()?, graph);
                    Some(PartnerRecord {
                        node,
                        policy: partner.policy,
                        accounting: partner.accounting,
                        initiator: partner.initiator,
                    })
                })
                .collect(),
        })),
        _ => ChannelRecord::Unknown(UnknownChannel {
            key,
            id: data.id,
            target: data.target,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FeeData, FeeReportEntry, LightningData, LocalNodeData};
    use std::collections::HashMap;

    const LOCAL: &str = "02local";
    const REMOTE: &str = "03remote";

    fn adapted_graph() -> AdaptedGraph {
        AdaptedGraph {
            at: Utc::now(),
            local: LocalNodeData {
                node: NodeData {
                    public_key: LOCAL.into(),
                    alias: Some("me".into()),
                    color: None,
                },
                platform: PlatformData {
                    chain: ChainData {
                        blockchain: "bitcoin".into(),
                        network: "mainnet".into(),
                    },
                    lightning: LightningData {
                        implementation: "lnd".into(),
                        version: "0.16.0-beta".into(),
                    },
                },
            },
            fee_report: HashMap::new(),
            channels: HashMap::new(),
            local_channels: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    fn fee(base: u64, rate: u64) -> FeeData {
        FeeData {
            base: Some(base),
            rate: Some(rate),
        }
    }

    fn gossip_partner(public_key: &str, fee: FeeData) -> PartnerData {
        PartnerData {
            public_key: Some(public_key.into()),
            policy: Some(PolicyData {
                fee: Some(fee),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn stub(id: &str, target: &str) -> ChannelData {
        ChannelData {
            id: id.into(),
            target: Some(target.into()),
            partners: vec![PartnerData::with_public_key(target)],
            ..Default::default()
        }
    }

    #[test]
    fn test_unresolved_channel_gets_fallback_key() {
        let graph = adapted_graph();
        let first = transform_channel(&stub("42", REMOTE), &graph);
        let second = transform_channel(&stub("42", LOCAL), &graph);
        let other = transform_channel(&stub("43", REMOTE), &graph);

        let ChannelRecord::Unknown(unknown) = &first else {
            panic!("expected an unknown channel");
        };
        assert_eq!(unknown.id, "42");
        assert_eq!(unknown.target.as_deref(), Some(REMOTE));
        assert_eq!(first.key(), second.key());
        assert_ne!(first.key(), other.key());
    }

    #[test]
    fn test_channel_info_wins_and_target_is_kept() {
        let mut graph = adapted_graph();
        graph.channels.insert(
            ShortChannelID(42),
            ChannelData {
                id: "42".into(),
                point: Some("gossip:1".into()),
                target: Some("ignored".into()),
                partners: vec![
                    gossip_partner("02aaa", fee(1, 10)),
                    gossip_partner("03bbb", fee(2, 20)),
                ],
                ..Default::default()
            },
        );

        let mut hop_stub = stub("42", "03bbb");
        hop_stub.point = Some("stub:0".into());

        let ChannelRecord::Known(channel) = transform_channel(&hop_stub, &graph) else {
            panic!("expected a known channel");
        };
        assert_eq!(channel.point.as_deref(), Some("gossip:1"));
        assert_eq!(channel.target.as_deref(), Some("03bbb"));
        assert!(!channel.mine);
        assert_eq!(channel.partners.len(), 2);
        assert!(channel.partners.iter().all(|partner| !partner.node.is_local()));
        let NodeRecord::Remote(remote) = &channel.partners[1].node else {
            panic!("expected a remote node");
        };
        assert_eq!(remote.chain.network, "mainnet");
    }

    #[test]
    fn test_fee_report_overrides_local_side_only() {
        let mut graph = adapted_graph();
        graph.channels.insert(
            ShortChannelID(7),
            ChannelData {
                id: "7".into(),
                partners: vec![
                    gossip_partner(REMOTE, fee(1_000, 1)),
                    gossip_partner(LOCAL, fee(0, 94)),
                ],
                ..Default::default()
            },
        );
        graph.fee_report.insert(
            ShortChannelID(7),
            FeeReportEntry {
                channel_id: ShortChannelID(7),
                point: None,
                fee: fee(0, 250),
            },
        );

        let ChannelRecord::Known(channel) = transform_channel(&stub("7", REMOTE), &graph) else {
            panic!("expected a known channel");
        };
        assert!(channel.mine);

        let local = &channel.partners[1];
        assert!(local.node.is_local());
        assert_eq!(
            local.policy.as_ref().and_then(|policy| policy.fee.clone()),
            Some(fee(0, 250))
        );
        let remote = &channel.partners[0];
        assert_eq!(
            remote.policy.as_ref().and_then(|policy| policy.fee.clone()),
            Some(fee(1_000, 1))
        );
    }

    #[test]
    fn test_local_channel_fills_gaps_by_partner_key() {
        let mut graph = adapted_graph();
        graph.channels.insert(
            ShortChannelID(7),
            ChannelData {
                id: "7".into(),
                accounting: Some(ChannelAccounting {
                    capacity: Some(2_000_000),
                    ..Default::default()
                }),
                partners: vec![
                    gossip_partner(LOCAL, fee(0, 94)),
                    gossip_partner(REMOTE, fee(1, 1)),
                ],
                ..Default::default()
            },
        );
        graph.local_channels.insert(
            ShortChannelID(7),
            ChannelData {
                id: "7".into(),
                point: Some("funding:0".into()),
                state: Some(ChannelState::Active),
                accounting: Some(ChannelAccounting {
                    capacity: Some(1),
                    sent: Some(5_000),
                    ..Default::default()
                }),
                partners: vec![
                    PartnerData {
                        public_key: Some(REMOTE.into()),
                        accounting: Some(PartnerAccounting {
                            balance: Some(400_000),
                        }),
                        initiator: Some(false),
                        policy: None,
                    },
                    PartnerData {
                        public_key: Some(LOCAL.into()),
                        accounting: Some(PartnerAccounting {
                            balance: Some(600_000),
                        }),
                        initiator: Some(true),
                        policy: None,
                    },
                ],
                ..Default::default()
            },
        );

        let ChannelRecord::Known(channel) = transform_channel(&stub("7", REMOTE), &graph) else {
            panic!("expected a known channel");
        };
        assert_eq!(channel.point.as_deref(), Some("funding:0"));
        assert_eq!(channel.state, Some(ChannelState::Active));

        let accounting = channel.accounting.clone().unwrap();
        assert_eq!(accounting.capacity, Some(2_000_000));
        assert_eq!(accounting.sent, Some(5_000));

        let local = &channel.partners[0];
        assert!(local.node.is_local());
        assert_eq!(local.accounting.as_ref().unwrap().balance, Some(600_000));
        assert_eq!(local.initiator, Some(true));
        assert!(local.policy.is_some());
        assert_eq!(
            channel.partners[1].accounting.as_ref().unwrap().balance,
            Some(400_000)
        );
    }
}
