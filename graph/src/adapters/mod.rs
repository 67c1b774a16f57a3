//! Normalized shapes produced from raw RPC responses.
//!
//! Each submodule maps exactly one raw response kind to one of the types
//! below. Adapters are pure and never look at each other's output; every
//! cross reference between entities happens in the payment stitcher.
//!
//! Optional fields mean "this source did not say". The stitcher fills them
//! from lower precedence sources through [`merge::FillGaps`].

use crate::utils::{ChannelState, Exposure, InvoiceStatus, PaymentState, ShortChannelID};
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub mod channel;
pub mod fee;
pub mod forward;
pub mod invoice;
pub mod merge;
pub mod node;
pub mod payment;
pub mod payment_request;

/// Identity of a node as reported by `get_node_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeData {
    pub public_key: String,
    pub alias: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainData {
    pub blockchain: String,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightningData {
    pub implementation: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformData {
    #[serde(flatten)]
    pub chain: ChainData,
    pub lightning: LightningData,
}

/// The local node as reported by `get_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalNodeData {
    pub node: NodeData,
    pub platform: PlatformData,
}

/// Routing fee. Serializes to `null` when neither component is known, which
/// is different from a zero fee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeData {
    /// Base fee in millisatoshis.
    pub base: Option<u64>,
    /// Proportional fee in parts per million.
    pub rate: Option<u64>,
}

impl FeeData {
    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.rate.is_none()
    }
}

impl Serialize for FeeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            return serializer.serialize_none();
        }
        let fields = usize::from(self.base.is_some()) + usize::from(self.rate.is_some());
        let mut state = serializer.serialize_struct("FeeData", fields)?;
        if let Some(base) = self.base {
            state.serialize_field("base", &base)?;
        }
        if let Some(rate) = self.rate {
            state.serialize_field("rate", &rate)?;
        }
        state.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HtlcData {
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
    pub blocks_delta: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyData {
    pub fee: Option<FeeData>,
    pub htlc: Option<HtlcData>,
    pub disabled: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartnerAccounting {
    pub balance: Option<u64>,
}

/// One side of a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartnerData {
    pub public_key: Option<String>,
    pub policy: Option<PolicyData>,
    pub accounting: Option<PartnerAccounting>,
    pub initiator: Option<bool>,
}

impl PartnerData {
    pub fn with_public_key(public_key: &str) -> Self {
        Self {
            public_key: Some(public_key.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelAccounting {
    pub capacity: Option<u64>,
    pub sent: Option<u64>,
    pub received: Option<u64>,
    pub unsettled: Option<u64>,
}

/// A channel as seen by one source: a hop, the gossip graph or the local
/// channel list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelData {
    /// Numeric channel id as a decimal string, or the raw id when unparsable.
    pub id: String,
    pub point: Option<String>,
    pub known: bool,
    pub mine: bool,
    /// Public key of the node the observing hop routed towards.
    pub target: Option<String>,
    pub opened_at: Option<DateTime<Utc>>,
    pub up_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub state: Option<ChannelState>,
    pub exposure: Option<Exposure>,
    pub accounting: Option<ChannelAccounting>,
    pub partners: Vec<PartnerData>,
}

impl ChannelData {
    pub fn short_channel_id(&self) -> Option<ShortChannelID> {
        self.id.parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DescriptionData {
    pub memo: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecretData {
    pub hash: Option<String>,
    pub preimage: Option<String>,
}

/// A payment request, possibly enriched with invoice settlement data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestData {
    /// The encoded request string.
    pub code: Option<String>,
    pub amount: Option<u64>,
    pub description: Option<DescriptionData>,
    pub secret: Option<SecretData>,
    pub address: Option<String>,
    pub destination: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
    /// Amount actually received, only known for settled invoices.
    pub paid: Option<u64>,
    pub state: Option<InvoiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceData {
    pub key: String,
    pub request: RequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeReportEntry {
    pub channel_id: ShortChannelID,
    pub point: Option<String>,
    pub fee: FeeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopData {
    /// 1-based position along the route.
    pub position: usize,
    pub first: bool,
    pub last: bool,
    pub amount: u64,
    pub fee: u64,
    pub public_key: String,
    pub channel: ChannelData,
}

/// Classification of a payment relative to the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentPurpose {
    SelfPayment,
    PeerToPeer,
    Rebalance,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentData {
    pub key: String,
    pub hash: String,
    pub at: Option<DateTime<Utc>>,
    pub amount: u64,
    pub fee: u64,
    pub state: PaymentState,
    pub purpose: PaymentPurpose,
    pub request: RequestData,
    pub hops: Vec<HopData>,
}

/// One side of a forward: the channel the HTLC used and the amount it carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardChannelData {
    pub amount: u64,
    pub channel: ChannelData,
}

/// A payment the local node routed for someone else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardData {
    pub key: String,
    pub at: Option<DateTime<Utc>>,
    pub fee: u64,
    #[serde(rename = "in")]
    pub incoming: ForwardChannelData,
    #[serde(rename = "out")]
    pub outgoing: ForwardChannelData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_without_components_serializes_to_null() {
        assert_eq!(
            serde_json::to_value(FeeData::default()).unwrap(),
            serde_json::Value::Null
        );

        let zero = FeeData {
            base: Some(0),
            rate: Some(0),
        };
        assert_eq!(
            serde_json::to_value(zero).unwrap(),
            serde_json::json!({ "base": 0, "rate": 0 })
        );

        let rate_only = FeeData {
            base: None,
            rate: Some(94),
        };
        assert_eq!(
            serde_json::to_value(rate_only).unwrap(),
            serde_json::json!({ "rate": 94 })
        );
    }
}
