//! Stitches adapted payments against the adapted lookups into self-contained
//! records.

use super::adapt::AdaptedSnapshot;
use crate::adapters::merge::FillGaps;
use crate::adapters::{HopData, PaymentData, PaymentPurpose, RequestData};
use crate::services::graph::transform::{
    ChannelRecord, NodeRecord, node_record, transform_channel,
};
use crate::utils::{EntityKind, PaymentState, entity_key};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where the request data came from, best source first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestResolution {
    Invoice,
    Decoded,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    pub key: String,
    pub resolution: RequestResolution,
    #[serde(flatten)]
    pub data: RequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopRecord {
    pub position: usize,
    pub first: bool,
    pub last: bool,
    pub amount: u64,
    pub fee: u64,
    pub peer: NodeRecord,
    pub channel: ChannelRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub key: String,
    pub hash: String,
    pub at: Option<DateTime<Utc>>,
    pub amount: u64,
    pub fee: u64,
    pub state: PaymentState,
    pub purpose: PaymentPurpose,
    pub request: RequestRecord,
    pub hops: Vec<HopRecord>,
}

/// Resolves a request: the invoice replaces it, otherwise it keeps its own
/// fields under a key derived from the encoded string. A decoded request then
/// fills whatever is still missing.
pub fn transform_request(request: &RequestData, adapted: &AdaptedSnapshot) -> RequestRecord {
    let invoice = request
        .secret
        .as_ref()
        .and_then(|secret| secret.hash.as_ref())
        .and_then(|hash| adapted.invoices.get(hash));

    let mut record = match invoice {
        Some(invoice) => RequestRecord {
            key: invoice.key.clone(),
            resolution: RequestResolution::Invoice,
            data: invoice.request.clone(),
        },
        None => RequestRecord {
            key: entity_key(
                EntityKind::Request,
                request.code.as_deref().unwrap_or_default(),
            ),
            resolution: RequestResolution::Unresolved,
            data: request.clone(),
        },
    };

    if let Some(decoded) = record
        .data
        .code
        .as_ref()
        .and_then(|code| adapted.requests.get(code))
    {
        record.data.fill_gaps(decoded);
        if record.resolution == RequestResolution::Unresolved {
            record.resolution = RequestResolution::Decoded;
        }
    }

    record
}

fn transform_hop(hop: &HopData, adapted: &AdaptedSnapshot) -> HopRecord {
    HopRecord {
        position: hop.position,
        first: hop.first,
        last: hop.last,
        amount: hop.amount,
        fee: hop.fee,
        peer: node_record(&hop.public_key, &adapted.graph),
        channel: transform_channel(&hop.channel, &adapted.graph),
    }
}

pub fn transform(payment: &PaymentData, adapted: &AdaptedSnapshot) -> PaymentRecord {
    PaymentRecord {
        key: payment.key.clone(),
        hash: payment.hash.clone(),
        at: payment.at,
        amount: payment.amount,
        fee: payment.fee,
        state: payment.state,
        purpose: payment.purpose,
        request: transform_request(&payment.request, adapted),
        hops: payment
            .hops
            .iter()
            .map(|hop| transform_hop(hop, adapted))
            .collect(),
    }
}
