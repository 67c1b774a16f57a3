//! Views over stitched payments, their requests and the hops they took.

use super::channel::Channel;
use super::node::Node;
use super::satoshis::Satoshis;
use crate::adapters::PaymentPurpose;
use crate::services::payment::transform::{
    HopRecord, PaymentRecord, RequestRecord, RequestResolution,
};
use crate::utils::{InvoiceStatus, PaymentState};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-only view of a payment request.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    record: &'a RequestRecord,
}

impl<'a> Request<'a> {
    pub fn new(record: &'a RequestRecord) -> Self {
        Self { record }
    }

    pub fn key(&self) -> &'a str {
        &self.record.key
    }

    pub fn resolution(&self) -> RequestResolution {
        self.record.resolution
    }

    pub fn code(&self) -> Option<&'a str> {
        self.record.data.code.as_deref()
    }

    pub fn amount(&self) -> Option<Satoshis> {
        self.record.data.amount.map(Satoshis::from_millisatoshis)
    }

    pub fn memo(&self) -> Option<&'a str> {
        self.record
            .data
            .description
            .as_ref()
            .and_then(|description| description.memo.as_deref())
    }

    pub fn description_hash(&self) -> Option<&'a str> {
        self.record
            .data
            .description
            .as_ref()
            .and_then(|description| description.hash.as_deref())
    }

    pub fn secret_hash(&self) -> Option<&'a str> {
        self.record
            .data
            .secret
            .as_ref()
            .and_then(|secret| secret.hash.as_deref())
    }

    pub fn secret_preimage(&self) -> Option<&'a str> {
        self.record
            .data
            .secret
            .as_ref()
            .and_then(|secret| secret.preimage.as_deref())
    }

    pub fn address(&self) -> Option<&'a str> {
        self.record.data.address.as_deref()
    }

    pub fn destination(&self) -> Option<&'a str> {
        self.record.data.destination.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.record.data.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.record.data.expires_at
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.record.data.settled_at
    }

    pub fn paid(&self) -> Option<Satoshis> {
        self.record.data.paid.map(Satoshis::from_millisatoshis)
    }

    /// Invoice state, only known when the request resolved to an invoice.
    pub fn state(&self) -> Option<InvoiceStatus> {
        self.record.data.state
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Hop<'a> {
    record: &'a HopRecord,
}

impl<'a> Hop<'a> {
    pub fn position(&self) -> usize {
        self.record.position
    }

    pub fn first(&self) -> bool {
        self.record.first
    }

    pub fn last(&self) -> bool {
        self.record.last
    }

    pub fn amount(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.amount)
    }

    pub fn fee(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.fee)
    }

    pub fn peer(&self) -> Node<'a> {
        Node::new(&self.record.peer)
    }

    pub fn channel(&self) -> Channel<'a> {
        Channel::new(&self.record.channel)
    }
}

/// A stitched outgoing payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payment {
    record: PaymentRecord,
}

impl Payment {
    pub fn new(record: PaymentRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &PaymentRecord {
        &self.record
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn hash(&self) -> &str {
        &self.record.hash
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        self.record.at
    }

    pub fn amount(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.amount)
    }

    pub fn fee(&self) -> Satoshis {
        Satoshis::from_millisatoshis(self.record.fee)
    }

    pub fn state(&self) -> PaymentState {
        self.record.state
    }

    pub fn purpose(&self) -> PaymentPurpose {
        self.record.purpose
    }

    pub fn request(&self) -> Request<'_> {
        Request::new(&self.record.request)
    }

    pub fn hops(&self) -> Vec<Hop<'_>> {
        self.record.hops.iter().map(|record| Hop { record }).collect()
    }

    /// The hop that delivered the payment to its destination.
    pub fn last_hop(&self) -> Option<Hop<'_>> {
        self.record.hops.last().map(|record| Hop { record })
    }
}
