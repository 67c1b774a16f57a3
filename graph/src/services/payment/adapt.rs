//! Runs every payments pass response through its adapter.

use super::fetch::RawSnapshot;
use crate::adapters::{self, InvoiceData, PaymentData, RequestData};
use crate::services::graph;
use crate::services::graph::adapt::AdaptedGraph;
use std::collections::HashMap;

/// The snapshot after every raw value went through its adapter.
///
/// Failed lookups are absent here; nothing downstream sees an error marker.
#[derive(Debug, Clone)]
pub struct AdaptedSnapshot {
    pub graph: AdaptedGraph,
    pub payments: Vec<PaymentData>,
    /// Decoded requests by encoded request string.
    pub requests: HashMap<String, RequestData>,
    /// Invoices by payment hash.
    pub invoices: HashMap<String, InvoiceData>,
}

pub fn adapt(raw: &RawSnapshot) -> AdaptedSnapshot {
    let get_info = &raw.graph.local.get_info;

    AdaptedSnapshot {
        graph: graph::adapt::adapt(&raw.graph),
        payments: raw
            .list_payments
            .iter()
            .map(|payment| adapters::payment::list_payments(payment, get_info))
            .collect(),
        requests: raw
            .decode_pay_req
            .iter()
            .filter_map(|(code, decoded)| {
                let decoded = decoded.as_ref().ok()?;
                Some((
                    code.clone(),
                    adapters::payment_request::decode_pay_req(decoded, code),
                ))
            })
            .collect(),
        invoices: raw
            .lookup_invoice
            .iter()
            .filter_map(|(hash, invoice)| {
                let invoice = invoice.as_ref().ok()?;
                Some((hash.clone(), adapters::invoice::lookup_invoice(invoice)))
            })
            .collect(),
    }
}
