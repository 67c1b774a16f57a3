//! Raw shapes returned by the node's RPC surface.
//!
//! These mirror the lnd responses field for field (amounts keep the unit and
//! sign the RPC uses) and are deliberately free of any interpretation; the
//! adapters turn them into normalized data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawChain {
    pub chain: String,
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGetInfo {
    pub identity_pubkey: String,
    pub alias: String,
    pub color: String,
    pub version: String,
    pub chains: Vec<RawChain>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawPaymentStatus {
    #[default]
    Unknown,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHop {
    pub chan_id: u64,
    pub amt_to_forward_msat: i64,
    pub fee_msat: i64,
    pub pub_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRoute {
    pub hops: Vec<RawHop>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHtlcAttempt {
    pub route: Option<RawRoute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayment {
    pub payment_hash: String,
    pub payment_preimage: String,
    pub value_msat: i64,
    pub fee_msat: i64,
    pub payment_request: String,
    pub status: RawPaymentStatus,
    pub creation_time_ns: i64,
    pub htlcs: Vec<RawHtlcAttempt>,
}

impl RawPayment {
    /// Route of the last HTLC attempt, the one that settled for a successful payment.
    pub fn last_route(&self) -> Option<&RawRoute> {
        self.htlcs.last().and_then(|htlc| htlc.route.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPaymentsPage {
    pub payments: Vec<RawPayment>,
    pub last_index_offset: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawChannelFee {
    pub chan_id: u64,
    pub channel_point: String,
    pub base_fee_msat: i64,
    pub fee_per_mil: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFeeReport {
    pub channel_fees: Vec<RawChannelFee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayReq {
    pub destination: String,
    pub payment_hash: String,
    pub num_msat: i64,
    pub timestamp: i64,
    pub expiry: i64,
    pub description: String,
    pub description_hash: String,
    /// Hex encoded payment address.
    pub payment_addr: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawInvoiceState {
    #[default]
    Open,
    Settled,
    Canceled,
    Accepted,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInvoice {
    pub memo: String,
    /// Hex encoded preimage.
    pub r_preimage: String,
    /// Hex encoded payment hash.
    pub r_hash: String,
    pub value_msat: i64,
    pub creation_date: i64,
    pub settle_date: i64,
    pub payment_request: String,
    /// Hex encoded description hash.
    pub description_hash: String,
    pub expiry: i64,
    pub amt_paid_msat: i64,
    pub state: RawInvoiceState,
    /// Hex encoded payment address.
    pub payment_addr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInvoicesPage {
    pub invoices: Vec<RawInvoice>,
    pub last_index_offset: u64,
}

/// Invoice the local node is asked to issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub memo: String,
    /// Zero lets the payer choose the amount.
    pub value_msat: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAddedInvoice {
    /// Hex encoded payment hash.
    pub r_hash: String,
    pub payment_request: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawForwardingEvent {
    pub chan_id_in: u64,
    pub chan_id_out: u64,
    pub amt_in_msat: u64,
    pub amt_out_msat: u64,
    pub fee_msat: u64,
    pub timestamp_ns: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawForwardsPage {
    pub forwarding_events: Vec<RawForwardingEvent>,
    pub last_offset_index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRoutingPolicy {
    pub time_lock_delta: u32,
    pub min_htlc: i64,
    pub fee_base_msat: i64,
    pub fee_rate_milli_msat: i64,
    pub disabled: bool,
    pub max_htlc_msat: u64,
    pub last_update: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawChannelEdge {
    pub channel_id: u64,
    pub chan_point: String,
    pub last_update: u32,
    pub node1_pub: String,
    pub node2_pub: String,
    pub capacity: i64,
    pub node1_policy: Option<RawRoutingPolicy>,
    pub node2_policy: Option<RawRoutingPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLocalChannel {
    pub active: bool,
    pub remote_pubkey: String,
    pub channel_point: String,
    pub chan_id: u64,
    pub capacity: i64,
    pub local_balance: i64,
    pub remote_balance: i64,
    pub unsettled_balance: i64,
    pub total_satoshis_sent: i64,
    pub total_satoshis_received: i64,
    pub private: bool,
    pub initiator: bool,
    /// Seconds since the channel was first seen.
    pub lifetime: i64,
    /// Seconds the remote peer has been online during `lifetime`.
    pub uptime: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLightningNode {
    pub pub_key: String,
    pub alias: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNodeInfo {
    pub node: Option<RawLightningNode>,
}

/// Outgoing policy change for one of the local node's channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyUpdate {
    /// Funding outpoint, `txid:index`.
    pub channel_point: String,
    pub base_fee_msat: i64,
    pub fee_rate_ppm: u32,
    pub time_lock_delta: u32,
    pub min_htlc_msat: Option<u64>,
    pub max_htlc_msat: Option<u64>,
}
