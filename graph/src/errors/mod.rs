//! Error types shared by the reconciliation pass and the domain models.
//!
//! `LightningError` describes a failed collaborator call and is what a
//! reconciliation pass returns when it aborts. `ModelError` is raised by the
//! read-only models when a caller asks for data the resolved variant does not
//! carry.

use thiserror::Error;

/// Represents errors that can occur during Lightning Network operations.
#[derive(Debug, Error)]
pub enum LightningError {
    /// Error that occurred while connecting to a Lightning node.
    #[error("Node connection error: {0}")]
    ConnectionError(String),
    /// Error that occurred while retrieving node information.
    #[error("Get info error: {0}")]
    GetInfoError(String),
    /// Error that occurred while paging through payments.
    #[error("Error while listing payments: {0}")]
    ListPaymentsError(String),
    /// Error that occurred while retrieving the fee report.
    #[error("Fee report error: {0}")]
    FeeReportError(String),
    /// Error that occurred while decoding a payment request.
    #[error("Decode payment request error: {0}")]
    DecodePayReqError(String),
    /// Error that occurred while looking up an invoice.
    #[error("Lookup invoice error: {0}")]
    LookupInvoiceError(String),
    /// Error that occurred while retrieving channel gossip.
    #[error("Get channel info error: {0}")]
    GetChanInfoError(String),
    /// Error that occurred while retrieving information about a specific node.
    #[error("Get node info error: {0}")]
    GetNodeInfoError(String),
    /// Error that occurred while listing the local channels with a peer.
    #[error("List channels error: {0}")]
    ListChannelsError(String),
    /// Error that occurred while paging through invoices.
    #[error("Error while listing invoices: {0}")]
    ListInvoicesError(String),
    /// Error that occurred while issuing an invoice.
    #[error("Add invoice error: {0}")]
    AddInvoiceError(String),
    /// Error that occurred while paging through forwarding events.
    #[error("Forwarding history error: {0}")]
    ForwardingHistoryError(String),
    /// Error that occurred while updating a channel policy.
    #[error("Update channel policy error: {0}")]
    UpdatePolicyError(String),
    /// Error that occurred during configuration validation.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
    /// Parse error for things like pubkeys or strings.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised when reading a field the resolved variant does not have.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The channel could not be resolved, only its raw id is known.
    #[error("Channel {0} is unknown to this node")]
    UnknownChannel(String),
    /// Implementation details are only known for the local node.
    #[error("Node {0} is not your node")]
    NotYourNode(String),
    /// The operation needs a channel owned by the local node.
    #[error("Channel {0} is not your channel")]
    NotYourChannel(String),
    /// The channel has no policy for the local side.
    #[error("Channel {0} has no policy to update")]
    MissingPolicy(String),
}

/// Errors returned by model operations that reach back out to the node.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Lightning(#[from] LightningError),
}
