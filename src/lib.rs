//! Supply-chain control tower
//!
//! Loads a shipment table, summarises it for dashboard panels, answers free-text
//! questions through a hosted model (with a rule-based fallback), and builds the
//! origin/destination arcs for the flow map.

pub mod advisory;
pub mod aggregator;
pub mod api;
pub mod arcs;
pub mod config;
pub mod geo;
pub mod models;
pub mod risk;
pub mod table;
