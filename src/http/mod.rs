//! Read-only operator HTTP surface.
//!
//! A thin calling layer over `Monitor::monitoring_data()`: the core itself
//! defines no wire protocol, this module just serves the consolidated
//! document (and slices of it) as JSON for dashboards and the CLI.

pub mod handlers;
pub mod server;

pub use server::OperatorServer;
