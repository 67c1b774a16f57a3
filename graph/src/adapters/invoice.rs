//! Adapter for invoices, from `lookup_invoice` and `list_invoices` alike.

use super::{DescriptionData, InvoiceData, RequestData, SecretData};
use crate::services::raw::{RawInvoice, RawInvoiceState};
use crate::utils::{
    EntityKind, InvoiceStatus, entity_key, from_unix_seconds, msat, non_empty, shift_seconds,
};

pub fn lookup_invoice(raw: &RawInvoice) -> InvoiceData {
    let created_at = from_unix_seconds(raw.creation_date);
    let state = match raw.state {
        RawInvoiceState::Open => InvoiceStatus::Open,
        RawInvoiceState::Settled => InvoiceStatus::Settled,
        RawInvoiceState::Canceled => InvoiceStatus::Canceled,
        RawInvoiceState::Accepted => InvoiceStatus::Accepted,
    };

    InvoiceData {
        key: entity_key(EntityKind::Invoice, &raw.r_hash),
        request: RequestData {
            code: non_empty(&raw.payment_request),
            amount: Some(msat(raw.value_msat)),
            description: Some(DescriptionData {
                memo: non_empty(&raw.memo),
                hash: non_empty(&raw.description_hash),
            }),
            secret: Some(SecretData {
                hash: non_empty(&raw.r_hash),
                preimage: non_empty(&raw.r_preimage),
            }),
            address: non_empty(&raw.payment_addr),
            destination: None,
            created_at,
            expires_at: created_at
                .and_then(|created_at| shift_seconds(created_at, raw.expiry)),
            settled_at: from_unix_seconds(raw.settle_date),
            paid: (raw.amt_paid_msat > 0).then(|| msat(raw.amt_paid_msat)),
            state: Some(state),
        },
    }
}
