//! Adapter for `list_payments` records.

use super::{ChannelData, HopData, PartnerData, PaymentData, RequestData, SecretData};
use crate::services::payment::purpose;
use crate::services::raw::{RawGetInfo, RawHop, RawPayment, RawPaymentStatus};
use crate::utils::{EntityKind, PaymentState, entity_key, from_unix_nanos, msat, non_empty};

fn hop(raw: &RawHop, index: usize, count: usize) -> HopData {
    HopData {
        position: index + 1,
        first: index == 0,
        last: index + 1 == count,
        amount: msat(raw.amt_to_forward_msat),
        fee: msat(raw.fee_msat),
        public_key: raw.pub_key.clone(),
        channel: ChannelData {
            id: raw.chan_id.to_string(),
            target: non_empty(&raw.pub_key),
            partners: vec![PartnerData::with_public_key(&raw.pub_key)],
            ..Default::default()
        },
    }
}

pub fn list_payments(raw: &RawPayment, get_info: &RawGetInfo) -> PaymentData {
    let state = match raw.status {
        RawPaymentStatus::Succeeded => PaymentState::Settled,
        RawPaymentStatus::Failed => PaymentState::Failed,
        RawPaymentStatus::Unknown | RawPaymentStatus::InFlight => PaymentState::Inflight,
    };

    let hops = raw
        .last_route()
        .map(|route| {
            let count = route.hops.len();
            route
                .hops
                .iter()
                .enumerate()
                .map(|(index, raw_hop)| hop(raw_hop, index, count))
                .collect()
        })
        .unwrap_or_default();

    PaymentData {
        key: entity_key(EntityKind::Payment, &raw.payment_hash),
        hash: raw.payment_hash.clone(),
        at: from_unix_nanos(raw.creation_time_ns),
        amount: msat(raw.value_msat),
        fee: msat(raw.fee_msat),
        state,
        purpose: purpose::classify(raw, &get_info.identity_pubkey),
        request: RequestData {
            code: non_empty(&raw.payment_request),
            amount: Some(msat(raw.value_msat)),
            secret: Some(SecretData {
                hash: non_empty(&raw.payment_hash),
                preimage: non_empty(&raw.payment_preimage),
            }),
            ..Default::default()
        },
        hops,
    }
}
