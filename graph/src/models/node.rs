use crate::errors::ModelError;
use crate::services::graph::transform::NodeRecord;

/// Read-only view of a node taking part in a payment or channel.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    record: &'a NodeRecord,
}

impl<'a> Node<'a> {
    pub fn new(record: &'a NodeRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a NodeRecord {
        self.record
    }

    pub fn key(&self) -> &'a str {
        self.record.key()
    }

    pub fn public_key(&self) -> &'a str {
        &self.record.data().public_key
    }

    pub fn alias(&self) -> Option<&'a str> {
        self.record.data().alias.as_deref()
    }

    pub fn color(&self) -> Option<&'a str> {
        self.record.data().color.as_deref()
    }

    pub fn myself(&self) -> bool {
        self.record.is_local()
    }

    pub fn blockchain(&self) -> &'a str {
        match self.record {
            NodeRecord::Local(node) => &node.platform.chain.blockchain,
            NodeRecord::Remote(node) => &node.chain.blockchain,
        }
    }

    pub fn network(&self) -> &'a str {
        match self.record {
            NodeRecord::Local(node) => &node.platform.chain.network,
            NodeRecord::Remote(node) => &node.chain.network,
        }
    }

    /// Lightning implementation; only known for the local node.
    pub fn implementation(&self) -> Result<&'a str, ModelError> {
        match self.record {
            NodeRecord::Local(node) => Ok(&node.platform.lightning.implementation),
            NodeRecord::Remote(node) => Err(ModelError::NotYourNode(node.node.public_key.clone())),
        }
    }

    /// Lightning implementation version; only known for the local node.
    pub fn version(&self) -> Result<&'a str, ModelError> {
        match self.record {
            NodeRecord::Local(node) => Ok(&node.platform.lightning.version),
            NodeRecord::Remote(node) => Err(ModelError::NotYourNode(node.node.public_key.clone())),
        }
    }
}
