//! Central module for application-wide configuration settings.
//!
//! This module handles loading the node connection parameters (address,
//! macaroon and certificate paths), which pass to run and its options.

use crate::services::forward::group::Direction;
use crate::services::node_manager::LndConnection;
use crate::services::payment::purpose::PurposeFilter;
use crate::utils::{self, NodeId};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

/// The reconciliation pass the runner performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pass {
    #[default]
    Payments,
    Forwards,
    ForwardsByChannel,
    Invoices,
}

impl FromStr for Pass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "payments" => Ok(Pass::Payments),
            "forwards" => Ok(Pass::Forwards),
            "forwards-by-channel" => Ok(Pass::ForwardsByChannel),
            "invoices" => Ok(Pass::Invoices),
            other => Err(format!("Unknown pass: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node_id: NodeId,
    pub address: String,
    pub macaroon_path: String,
    pub cert_path: String,
    pub pass: Pass,
    pub purpose: PurposeFilter,
    pub direction: Direction,
    pub hours_ago: Option<u32>,
    pub limit: Option<usize>,
}

fn optional_number<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{key} must be a valid number"))
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Loads configuration from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let node_id = var("LND_NODE_ID").context("LND_NODE_ID not set")?;
        let node_id = NodeId::from_str(&node_id).unwrap_or_else(|never| match never {});

        let address = var("LND_ADDRESS").context("LND_ADDRESS not set")?;

        let macaroon_path = var("LND_MACAROON_PATH").context("LND_MACAROON_PATH not set")?;
        let macaroon_path = utils::expand_path(&macaroon_path)
            .context("LND_MACAROON_PATH must be a valid path")?;

        let cert_path = var("LND_CERT_PATH").context("LND_CERT_PATH not set")?;
        let cert_path =
            utils::expand_path(&cert_path).context("LND_CERT_PATH must be a valid path")?;

        let pass = var("GRAPH_PASS")
            .unwrap_or_default()
            .parse::<Pass>()
            .map_err(|err| anyhow!(err))
            .context("GRAPH_PASS must name a pass")?;

        let purpose = var("PAYMENTS_PURPOSE")
            .unwrap_or_default()
            .parse::<PurposeFilter>()
            .map_err(|err| anyhow!(err))
            .context("PAYMENTS_PURPOSE must be a valid purpose filter")?;

        let direction = var("FORWARDS_DIRECTION")
            .unwrap_or_default()
            .parse::<Direction>()
            .map_err(|err| anyhow!(err))
            .context("FORWARDS_DIRECTION must be in or out")?;

        let hours_ago = optional_number(&var, "FORWARDS_HOURS_AGO")?;
        let limit = optional_number(&var, "GRAPH_LIMIT")?;

        Ok(Config {
            node_id,
            address: utils::normalize_address(&address),
            macaroon_path,
            cert_path,
            pass,
            purpose,
            direction,
            hours_ago,
            limit,
        })
    }

    pub fn lnd_connection(&self) -> LndConnection {
        LndConnection {
            id: self.node_id.clone(),
            address: self.address.clone(),
            macaroon: self.macaroon_path.clone(),
            cert: self.cert_path.clone(),
        }
    }
}
