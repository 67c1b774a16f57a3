//! Channel adapters for the gossip view (`get_chan_info`) and the local
//! channel list (`list_channels`).

use super::{
    ChannelAccounting, ChannelData, FeeData, HtlcData, PartnerAccounting, PartnerData, PolicyData,
};
use crate::services::raw::{RawChannelEdge, RawLocalChannel, RawRoutingPolicy};
use crate::utils::{
    ChannelState, Exposure, from_unix_seconds, msat, non_empty, sat_to_msat, shift_seconds,
};
use chrono::{DateTime, Utc};

fn policy(raw: &RawRoutingPolicy) -> PolicyData {
    PolicyData {
        fee: Some(FeeData {
            base: Some(msat(raw.fee_base_msat)),
            rate: Some(msat(raw.fee_rate_milli_msat)),
        }),
        htlc: Some(HtlcData {
            minimum: Some(msat(raw.min_htlc)),
            maximum: (raw.max_htlc_msat > 0).then_some(raw.max_htlc_msat),
            blocks_delta: Some(raw.time_lock_delta),
        }),
        disabled: Some(raw.disabled),
        updated_at: from_unix_seconds(i64::from(raw.last_update)),
    }
}

fn gossip_partner(public_key: &str, raw_policy: &Option<RawRoutingPolicy>) -> Option<PartnerData> {
    let public_key = non_empty(public_key)?;
    Some(PartnerData {
        public_key: Some(public_key),
        policy: raw_policy.as_ref().map(policy),
        ..Default::default()
    })
}

pub fn get_chan_info(raw: &RawChannelEdge) -> ChannelData {
    let partners = [
        gossip_partner(&raw.node1_pub, &raw.node1_policy),
        gossip_partner(&raw.node2_pub, &raw.node2_policy),
    ]
    .into_iter()
    .flatten()
    .collect();

    ChannelData {
        id: raw.channel_id.to_string(),
        point: non_empty(&raw.chan_point),
        updated_at: from_unix_seconds(i64::from(raw.last_update)),
        accounting: Some(ChannelAccounting {
            capacity: Some(sat_to_msat(raw.capacity)),
            ..Default::default()
        }),
        partners,
        ..Default::default()
    }
}

/// `at` is the snapshot time the relative lifetime/uptime are anchored to;
/// `local_public_key` identifies the local side, which the entry leaves implicit.
pub fn list_channels(
    raw: &RawLocalChannel,
    at: DateTime<Utc>,
    local_public_key: &str,
) -> ChannelData {
    ChannelData {
        id: raw.chan_id.to_string(),
        point: non_empty(&raw.channel_point),
        opened_at: shift_seconds(at, raw.lifetime.saturating_neg()),
        up_at: shift_seconds(at, raw.uptime.saturating_neg()),
        state: Some(if raw.active {
            ChannelState::Active
        } else {
            ChannelState::Inactive
        }),
        exposure: Some(if raw.private {
            Exposure::Private
        } else {
            Exposure::Public
        }),
        accounting: Some(ChannelAccounting {
            capacity: Some(sat_to_msat(raw.capacity)),
            sent: Some(sat_to_msat(raw.total_satoshis_sent)),
            received: Some(sat_to_msat(raw.total_satoshis_received)),
            unsettled: Some(sat_to_msat(raw.unsettled_balance)),
        }),
        partners: vec![
            PartnerData {
                public_key: non_empty(&raw.remote_pubkey),
                accounting: Some(PartnerAccounting {
                    balance: Some(sat_to_msat(raw.remote_balance)),
                }),
                initiator: Some(!raw.initiator),
                policy: None,
            },
            PartnerData {
                public_key: non_empty(local_public_key),
                accounting: Some(PartnerAccounting {
                    balance: Some(sat_to_msat(raw.local_balance)),
                }),
                initiator: Some(raw.initiator),
                policy: None,
            },
        ],
        ..Default::default()
    }
}
