//! Invoices issued by the local node: listing, lookup by payment hash and
//! creation.

use crate::adapters;
use crate::adapters::merge::FillGaps;
use crate::errors::LightningError;
use crate::models::{Invoice, Satoshis};
use crate::services::graph::fetch::{log_failures, lookup_each};
use crate::services::node_manager::LightningClient;
use crate::services::payment::transform::{RequestRecord, RequestResolution};
use crate::services::raw::{NewInvoice, RawInvoice, RawPayReq};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Completes an invoice with its decoded request, when there is one.
fn stitch(invoice: &RawInvoice, decoded: Option<&RawPayReq>) -> RequestRecord {
    let adapted = adapters::invoice::lookup_invoice(invoice);

    let mut record = RequestRecord {
        key: adapted.key,
        resolution: RequestResolution::Invoice,
        data: adapted.request,
    };
    if let Some(decoded) = decoded {
        let decoded = adapters::payment_request::decode_pay_req(decoded, &invoice.payment_request);
        record.data.fill_gaps(&decoded);
    }

    record
}

/// Pages through `list_invoices` and keeps the newest `limit` invoices.
pub async fn fetch_invoices<C: LightningClient + ?Sized>(
    client: &C,
    limit: Option<usize>,
) -> Result<Vec<RawInvoice>, LightningError> {
    let mut last_offset = 0;
    let mut invoices = Vec::new();

    loop {
        let page = client.list_invoices(last_offset).await?;
        debug!(
            "list_invoices page at offset {} returned {} invoices",
            last_offset,
            page.invoices.len()
        );

        if page.invoices.is_empty() {
            break;
        }
        invoices.extend(page.invoices);

        if page.last_index_offset <= last_offset {
            break;
        }
        last_offset = page.last_index_offset;
    }

    invoices.sort_by_key(|invoice| Reverse(invoice.creation_date));
    if let Some(limit) = limit {
        invoices.truncate(limit);
    }

    Ok(invoices)
}

/// Lists invoices newest first, each completed with its decoded request. Every
/// distinct request string is decoded once; one that fails to decode only
/// leaves the invoice's own fields.
pub async fn data<C: LightningClient + ?Sized>(
    client: &C,
    limit: Option<usize>,
) -> Result<Vec<RequestRecord>, LightningError> {
    let invoices = fetch_invoices(client, limit).await?;

    let codes: BTreeSet<String> = invoices
        .iter()
        .map(|invoice| invoice.payment_request.clone())
        .filter(|code| !code.is_empty())
        .collect();
    let decoded = lookup_each(codes, move |code: String| async move {
        client.decode_pay_req(&code).await
    })
    .await;
    log_failures("decode_pay_req", &decoded);

    info!("Fetched {} invoices", invoices.len());

    Ok(invoices
        .iter()
        .map(|invoice| {
            let decoded = decoded
                .get(&invoice.payment_request)
                .and_then(|decoded| decoded.as_ref().ok());
            stitch(invoice, decoded)
        })
        .collect())
}

pub fn model(records: Vec<RequestRecord>) -> Vec<Invoice> {
    records.into_iter().map(Invoice::new).collect()
}

pub async fn all<C: LightningClient + ?Sized>(
    client: &C,
    limit: Option<usize>,
) -> Result<Vec<Invoice>, LightningError> {
    Ok(model(data(client, limit).await?))
}

/// The most recently created invoice.
pub async fn first<C: LightningClient + ?Sized>(
    client: &C,
) -> Result<Option<Invoice>, LightningError> {
    Ok(all(client, Some(1)).await?.into_iter().next())
}

/// The oldest invoice.
pub async fn last<C: LightningClient + ?Sized>(
    client: &C,
) -> Result<Option<Invoice>, LightningError> {
    Ok(all(client, None).await?.pop())
}

/// Finds the invoice for a payment hash and completes it with its decoded
/// request. A missing invoice is an error; a request that fails to decode
/// only leaves the invoice's own fields.
pub async fn find_by_secret_hash<C: LightningClient + ?Sized>(
    client: &C,
    secret_hash: &str,
) -> Result<Invoice, LightningError> {
    let invoice = client.lookup_invoice(secret_hash).await?;

    if invoice.payment_request.is_empty() {
        return Ok(Invoice::new(stitch(&invoice, None)));
    }

    let decoded = match client.decode_pay_req(&invoice.payment_request).await {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!("Could not decode request of invoice {}: {}", secret_hash, err);
            None
        }
    };

    Ok(Invoice::new(stitch(&invoice, decoded.as_ref())))
}

/// What [`create`] would ask the node for. No amount lets the payer choose.
pub fn prepare(description: Option<&str>, amount: Option<Satoshis>) -> NewInvoice {
    NewInvoice {
        memo: description.unwrap_or_default().to_string(),
        value_msat: amount.map(|amount| amount.millisatoshis()).unwrap_or_default(),
    }
}

/// Issues an invoice and reads it back from the node.
pub async fn create<C: LightningClient + ?Sized>(
    client: &C,
    invoice: &NewInvoice,
) -> Result<Invoice, LightningError> {
    let added = client.add_invoice(invoice).await?;
    find_by_secret_hash(client, &added.r_hash).await
}
