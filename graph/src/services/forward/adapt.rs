use super::fetch::RawSnapshot;
use crate::adapters::{self, ForwardData};
use crate::services::graph;
use crate::services::graph::adapt::AdaptedGraph;

#[derive(Debug, Clone)]
pub struct AdaptedSnapshot {
    pub graph: AdaptedGraph,
    pub forwards: Vec<ForwardData>,
}

pub fn adapt(raw: &RawSnapshot) -> AdaptedSnapshot {
    AdaptedSnapshot {
        graph: graph::adapt::adapt(&raw.graph),
        forwards: raw
            .forwarding_history
            .iter()
            .map(adapters::forward::forwarding_history)
            .collect(),
    }
}
