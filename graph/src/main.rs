//! Main entry point for the payment graph runner.
//!
//! This file loads the node configuration, connects to the node, runs the
//! configured reconciliation pass and prints its records as JSON.

use anyhow::{Context, Result};
use nodegaze_graph::config::{Config, Pass};
use nodegaze_graph::services::node_manager::LndNode;
use nodegaze_graph::services::{forward, invoice, payment};
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> Result<()> {
    init();

    let config = Config::from_env()?;
    info!("Connecting to {} at {}", config.node_id, config.address);
    let node = LndNode::new(config.lnd_connection())
        .await
        .context("Failed to connect to the node")?;

    let output = match config.pass {
        Pass::Payments => {
            let payments = payment::all(&node, config.purpose, config.limit)
                .await
                .context("Payments pass failed")?;
            info!("Reconciled {} payments", payments.len());
            serde_json::to_string_pretty(&payments)?
        }
        Pass::Forwards => {
            let forwards = forward::all(&node, config.limit)
                .await
                .context("Forwards pass failed")?;
            info!("Reconciled {} forwards", forwards.len());
            serde_json::to_string_pretty(&forwards)?
        }
        Pass::ForwardsByChannel => {
            let groups =
                forward::group_by_channel(&node, config.direction, config.hours_ago, config.limit)
                    .await
                    .context("Forwards pass failed")?;
            info!("Grouped forwards into {} channels", groups.len());
            serde_json::to_string_pretty(&groups)?
        }
        Pass::Invoices => {
            let invoices = invoice::all(&node, config.limit)
                .await
                .context("Invoice listing failed")?;
            info!("Listed {} invoices", invoices.len());
            serde_json::to_string_pretty(&invoices)?
        }
    };

    println!("{output}");
    Ok(())
}
