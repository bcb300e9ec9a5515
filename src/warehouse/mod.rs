// ABOUTME: Warehouse extractor module
// ABOUTME: Exports TLS connection, row conversion, and table extraction

pub mod connect;
pub mod convert;
pub mod extract;

pub use connect::connect;
pub use extract::{extract, WAREHOUSE_QUERY};
