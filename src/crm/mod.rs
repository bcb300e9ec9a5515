// ABOUTME: CRM extractor module
// ABOUTME: Exports the query client, wire models, and table extraction

pub mod client;
pub mod extract;
pub mod models;

pub use client::CrmClient;
pub use extract::{extract, EVENT_QUERY};
