// ABOUTME: CRM-to-warehouse contract event reconciliation job
// ABOUTME: Flags stale timestamp mismatches and publishes them as CSV

pub mod commands;
pub mod config;
pub mod crm;
pub mod publish;
pub mod reconcile;
pub mod table;
pub mod warehouse;

pub use config::Config;
pub use table::{Cell, Table};
