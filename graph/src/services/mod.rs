//! Module for core business logic services.
//!
//! This module holds the node connection and the reconciliation passes that
//! turn the node's RPC responses into stitched records.

#[cfg(test)]
pub mod fixture;
pub mod forward;
pub mod graph;
pub mod invoice;
pub mod node_manager;
pub mod payment;
pub mod raw;
