//! Snapshot fetching and secondary lookup deduplication for one payments pass.
//!
//! Two lookup chains run side by side once the payments are known. The
//! request chain decodes request strings and looks up invoices, then decodes
//! the request strings those invoices surfaced. The channel chain is
//! [`graph::fetch::resolve`]. Neither chain issues a call the other one does,
//! so every key is still asked for once.

use super::purpose::{PurposeFilter, classify};
use crate::errors::LightningError;
use crate::services::graph;
use crate::services::graph::fetch::{Lookup, RawGraph, log_failures, lookup_each};
use crate::services::node_manager::LightningClient;
use crate::services::raw::{RawInvoice, RawPayReq, RawPayment};
use crate::utils::ShortChannelID;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Everything the node said during one pass, keyed by lookup key.
#[derive(Debug)]
pub struct RawSnapshot {
    pub list_payments: Vec<RawPayment>,
    /// Keyed by encoded payment request.
    pub decode_pay_req: HashMap<String, Lookup<RawPayReq>>,
    /// Keyed by hex payment hash.
    pub lookup_invoice: HashMap<String, Lookup<RawInvoice>>,
    pub graph: RawGraph,
}

/// Pages through `list_payments` and keeps the payments the filter accepts,
/// newest first, at most `limit` of them.
///
/// The limit is applied after sorting, so it never shortens pagination.
pub async fn fetch_payments<C: LightningClient + ?Sized>(
    client: &C,
    local_public_key: &str,
    filter: PurposeFilter,
    limit: Option<usize>,
) -> Result<Vec<RawPayment>, LightningError> {
    let mut last_offset = 0;
    let mut payments = Vec::new();

    loop {
        let page = client.list_payments(last_offset).await?;
        debug!(
            "list_payments page at offset {} returned {} payments",
            last_offset,
            page.payments.len()
        );

        payments.extend(
            page.payments
                .into_iter()
                .filter(|payment| filter.matches(classify(payment, local_public_key))),
        );

        if page.last_index_offset <= last_offset {
            break;
        }
        last_offset = page.last_index_offset;
    }

    payments.sort_by_key(|payment| Reverse(payment.creation_time_ns));
    if let Some(limit) = limit {
        payments.truncate(limit);
    }

    Ok(payments)
}

/// Decodes `request_codes` and looks up `payment_hashes`, then decodes the
/// request strings of found invoices that were not decoded yet.
pub async fn resolve_requests<C: LightningClient + ?Sized>(
    client: &C,
    request_codes: BTreeSet<String>,
    payment_hashes: BTreeSet<String>,
) -> (
    HashMap<String, Lookup<RawPayReq>>,
    HashMap<String, Lookup<RawInvoice>>,
) {
    let (mut decode_pay_req, lookup_invoice) = futures::join!(
        lookup_each(request_codes, move |code: String| async move {
            client.decode_pay_req(&code).await
        }),
        lookup_each(payment_hashes, move |hash: String| async move {
            client.lookup_invoice(&hash).await
        }),
    );

    let invoice_codes: BTreeSet<String> = lookup_invoice
        .values()
        .filter_map(|invoice| invoice.as_ref().ok())
        .map(|invoice| invoice.payment_request.clone())
        .filter(|code| !code.is_empty() && !decode_pay_req.contains_key(code))
        .collect();

    decode_pay_req.extend(
        lookup_each(invoice_codes, move |code: String| async move {
            client.decode_pay_req(&code).await
        })
        .await,
    );

    log_failures("decode_pay_req", &decode_pay_req);
    log_failures("lookup_invoice", &lookup_invoice);

    (decode_pay_req, lookup_invoice)
}

/// Captures the snapshot for one pass and resolves every secondary lookup the
/// selected payments reference.
pub async fn fetch<C: LightningClient + ?Sized>(
    client: &C,
    filter: PurposeFilter,
    limit: Option<usize>,
) -> Result<RawSnapshot, LightningError> {
    let local = graph::fetch::fetch_local(client).await?;
    let list_payments = fetch_payments(client, local.public_key(), filter, limit).await?;

    let mut request_codes = BTreeSet::new();
    let mut payment_hashes = BTreeSet::new();
    let mut channel_ids = BTreeSet::new();
    let mut hop_keys = BTreeSet::new();
    for payment in &list_payments {
        if !payment.payment_request.is_empty() {
            request_codes.insert(payment.payment_request.clone());
        }
        if !payment.payment_hash.is_empty() {
            payment_hashes.insert(payment.payment_hash.clone());
        }
        for hop in payment.last_route().into_iter().flat_map(|route| &route.hops) {
            channel_ids.insert(ShortChannelID(hop.chan_id));
            if !hop.pub_key.is_empty() {
                hop_keys.insert(hop.pub_key.clone());
            }
        }
    }

    let ((decode_pay_req, lookup_invoice), graph) = futures::join!(
        resolve_requests(client, request_codes, payment_hashes),
        graph::fetch::resolve(client, local, channel_ids, hop_keys),
    );
    let graph = graph?;

    info!(
        "Fetched {} payments with {} requests and {} invoices",
        list_payments.len(),
        decode_pay_req.len(),
        lookup_invoice.len()
    );

    Ok(RawSnapshot {
        list_payments,
        decode_pay_req,
        lookup_invoice,
        graph,
    })
}
