//! View over an invoice the local node issued.

use super::payment::Request;
use crate::services::payment::transform::RequestRecord;
use serde::Serialize;

/// An invoice issued by the local node, completed with its decoded request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Invoice {
    record: RequestRecord,
}

impl Invoice {
    pub fn new(record: RequestRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &RequestRecord {
        &self.record
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn request(&self) -> Request<'_> {
        Request::new(&self.record)
    }
}
