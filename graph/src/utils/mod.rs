//! Collection of general utility functions and common types.
//!
//! This module holds identifiers, state enums and small helpers shared by the
//! adapters, the reconciliation pass and the models.

use crate::errors::LightningError;
use bitcoin::hashes::{Hash, sha256};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use expanduser::expanduser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Represents a node id, either by its public key or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeId {
    /// The node's public key, hex encoded.
    PublicKey(String),
    /// The node's alias (human-readable name).
    Alias(String),
}

impl NodeId {
    /// Validates that the provided node id matches the one returned by the backend.
    pub fn validate(&self, public_key: &str, alias: &str) -> Result<(), LightningError> {
        match self {
            NodeId::PublicKey(pk) => {
                if pk != public_key {
                    return Err(LightningError::ValidationError(format!(
                        "The provided node id does not match the one returned by the backend ({} != {}).",
                        pk, public_key
                    )));
                }
            }
            NodeId::Alias(a) => {
                if a != alias {
                    return Err(LightningError::ValidationError(format!(
                        "The provided alias does not match the one returned by the backend ({} != {}).",
                        a, alias
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FromStr for NodeId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if bitcoin::secp256k1::PublicKey::from_str(s).is_ok() {
            Ok(NodeId::PublicKey(s.to_lowercase()))
        } else {
            Ok(NodeId::Alias(s.to_string()))
        }
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                NodeId::PublicKey(pk) => pk.as_str(),
                NodeId::Alias(a) => a.as_str(),
            }
        )
    }
}

/// Represents a short channel ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShortChannelID(pub u64);

impl ShortChannelID {
    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for ShortChannelID {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>()?;
        Ok(Self(id))
    }
}

impl Display for ShortChannelID {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ShortChannelID {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ShortChannelID> for u64 {
    fn from(id: ShortChannelID) -> u64 {
        id.0
    }
}

/// Kind tag mixed into content-derived keys so that equal raw values of
/// different entity kinds never share an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Payment,
    Request,
    Invoice,
    Channel,
    Node,
    Forward,
    ForwardsGroup,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Payment => "payment",
            EntityKind::Request => "request",
            EntityKind::Invoice => "invoice",
            EntityKind::Channel => "channel",
            EntityKind::Node => "node",
            EntityKind::Forward => "forward",
            EntityKind::ForwardsGroup => "forwards-group",
        }
    }
}

/// Stable identity for an entity, derived from its raw discriminator.
///
/// Returns the 64 character hex SHA-256 digest of `"<kind>:<raw>"`. Every site
/// that needs a fallback identity goes through here.
pub fn entity_key(kind: EntityKind, raw: &str) -> String {
    let preimage = format!("{}:{}", kind.as_str(), raw);
    sha256::Hash::hash(preimage.as_bytes()).to_string()
}

/// Converts a unix timestamp in seconds, treating zero and out of range
/// values as absent.
pub fn from_unix_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    if seconds <= 0 {
        return None;
    }
    Utc.timestamp_opt(seconds, 0).single()
}

/// Converts a unix timestamp in nanoseconds, treating zero as absent.
pub fn from_unix_nanos(nanos: i64) -> Option<DateTime<Utc>> {
    if nanos <= 0 {
        return None;
    }
    Some(Utc.timestamp_nanos(nanos))
}

/// Shifts `at` by a signed number of seconds, `None` when out of range.
pub fn shift_seconds(at: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(seconds).and_then(|delta| at.checked_add_signed(delta))
}

/// Converts an RPC amount in satoshis to millisatoshis, clamping negatives to zero.
pub fn sat_to_msat(sat: i64) -> u64 {
    u64::try_from(sat).unwrap_or(0).saturating_mul(1000)
}

/// Converts a signed RPC amount in millisatoshis, clamping negatives to zero.
pub fn msat(value: i64) -> u64 {
    value.try_into().unwrap_or(0)
}

/// Returns `None` for the empty strings the RPC uses as "not set".
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Prefixes a bare `host:port` with `https://`.
pub fn normalize_address(address: &str) -> String {
    if address.starts_with("https://") || address.starts_with("http://") {
        address.to_string()
    } else {
        format!("https://{}", address)
    }
}

/// Expands a leading `~` in a file path.
pub fn expand_path(path: &str) -> Result<String, std::io::Error> {
    Ok(expanduser(path)?.display().to_string())
}

/// Settlement state of an outgoing payment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Inflight,
    Failed,
    Settled,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Copy)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Open,
    Settled,
    Canceled,
    Accepted,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Public,
    Private,
}
