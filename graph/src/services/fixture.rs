//! Recorded responses standing in for a node in tests.

use crate::errors::LightningError;
use crate::services::node_manager::LightningClient;
use crate::services::raw::{
    NewInvoice, PolicyUpdate, RawAddedInvoice, RawChannelEdge, RawFeeReport, RawForwardsPage,
    RawGetInfo, RawInvoice, RawInvoicesPage, RawLocalChannel, RawNodeInfo, RawPayReq,
    RawPaymentsPage,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers from the maps below and counts every call by method and key.
/// A key with no recorded answer fails the way the node would.
#[derive(Default)]
pub struct FixtureClient {
    pub get_info: RawGetInfo,
    pub fee_report: RawFeeReport,
    /// Pages by the offset they are requested at.
    pub pages: HashMap<u64, RawPaymentsPage>,
    pub pay_reqs: HashMap<String, RawPayReq>,
    pub invoices: HashMap<String, RawInvoice>,
    /// Invoice listing pages by the offset they are requested at.
    pub invoice_pages: HashMap<u64, RawInvoicesPage>,
    /// Forwarding history pages by the offset they are requested at.
    pub forward_pages: HashMap<u32, RawForwardsPage>,
    /// What `add_invoice` answers with; `None` makes it fail.
    pub added_invoice: Option<RawAddedInvoice>,
    pub channels: HashMap<u64, RawChannelEdge>,
    pub nodes: HashMap<String, RawNodeInfo>,
    /// Local channels by remote public key.
    pub local_channels: HashMap<String, Vec<RawLocalChannel>>,
    pub failed_policy_update: Option<String>,
    pub(crate) calls: Mutex<HashMap<(&'static str, String), usize>>,
    pub(crate) updates: Mutex<Vec<PolicyUpdate>>,
    pub(crate) created: Mutex<Vec<NewInvoice>>,
}

/// Methods that page through a listing and so may repeat a key legitimately.
const PAGINATED: [&str; 3] = ["list_payments", "list_invoices", "forwarding_history"];

impl FixtureClient {
    fn record(&self, method: &'static str, key: impl ToString) {
        let mut calls = self.calls.lock().unwrap();
        *calls.entry((method, key.to_string())).or_default() += 1;
    }

    /// Total calls made to `method`.
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|((called, _), _)| *called == method)
            .map(|(_, count)| count)
            .sum()
    }

    /// Highest number of calls any single method and key received.
    pub fn max_calls_per_key(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|((method, _), _)| !PAGINATED.contains(method))
            .map(|(_, count)| *count)
            .max()
            .unwrap_or_default()
    }

    /// Keys `method` was called with, sorted.
    pub fn keys(&self, method: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .calls
            .lock()
            .unwrap()
            .keys()
            .filter(|(called, _)| *called == method)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn policy_updates(&self) -> Vec<PolicyUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn created_invoices(&self) -> Vec<NewInvoice> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl LightningClient for FixtureClient {
    async fn get_info(&self) -> Result<RawGetInfo, LightningError> {
        self.record("get_info", "");
        Ok(self.get_info.clone())
    }

    async fn list_payments(&self, index_offset: u64) -> Result<RawPaymentsPage, LightningError> {
        self.record("list_payments", index_offset);
        Ok(self.pages.get(&index_offset).cloned().unwrap_or_default())
    }

    async fn fee_report(&self) -> Result<RawFeeReport, LightningError> {
        self.record("fee_report", "");
        Ok(self.fee_report.clone())
    }

    async fn decode_pay_req(&self, pay_req: &str) -> Result<RawPayReq, LightningError> {
        self.record("decode_pay_req", pay_req);
        self.pay_reqs
            .get(pay_req)
            .cloned()
            .ok_or_else(|| LightningError::DecodePayReqError(format!("invalid request {pay_req}")))
    }

    async fn lookup_invoice(&self, r_hash_str: &str) -> Result<RawInvoice, LightningError> {
        self.record("lookup_invoice", r_hash_str);
        self.invoices
            .get(r_hash_str)
            .cloned()
            .ok_or_else(|| LightningError::LookupInvoiceError("unable to locate invoice".into()))
    }

    async fn list_invoices(&self, index_offset: u64) -> Result<RawInvoicesPage, LightningError> {
        self.record("list_invoices", index_offset);
        Ok(self
            .invoice_pages
            .get(&index_offset)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_invoice(&self, invoice: &NewInvoice) -> Result<RawAddedInvoice, LightningError> {
        self.record("add_invoice", &invoice.memo);
        self.created.lock().unwrap().push(invoice.clone());
        self.added_invoice
            .clone()
            .ok_or_else(|| LightningError::AddInvoiceError("invoice creation disabled".into()))
    }

    async fn forwarding_history(
        &self,
        index_offset: u32,
        start_time: u64,
    ) -> Result<RawForwardsPage, LightningError> {
        self.record("forwarding_history", format!("{index_offset}@{start_time}"));
        Ok(self
            .forward_pages
            .get(&index_offset)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_chan_info(&self, chan_id: u64) -> Result<RawChannelEdge, LightningError> {
        self.record("get_chan_info", chan_id);
        self.channels
            .get(&chan_id)
            .cloned()
            .ok_or_else(|| LightningError::GetChanInfoError("edge not found".into()))
    }

    async fn get_node_info(&self, pub_key: &str) -> Result<RawNodeInfo, LightningError> {
        self.record("get_node_info", pub_key);
        self.nodes
            .get(pub_key)
            .cloned()
            .ok_or_else(|| LightningError::GetNodeInfoError(format!("unable to find node {pub_key}")))
    }

    async fn list_channels(&self, peer: &str) -> Result<Vec<RawLocalChannel>, LightningError> {
        self.record("list_channels", peer);
        Ok(self.local_channels.get(peer).cloned().unwrap_or_default())
    }

    async fn update_channel_policy(&self, update: &PolicyUpdate) -> Result<(), LightningError> {
        self.record("update_channel_policy", &update.channel_point);
        if let Some(reason) = &self.failed_policy_update {
            return Err(LightningError::UpdatePolicyError(format!(
                "{}: {}",
                update.channel_point, reason
            )));
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}
