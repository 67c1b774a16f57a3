//! Reconciles a Lightning node's RPC responses into a graph of payments,
//! forwards, invoices, channels and nodes.

pub mod adapters;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
