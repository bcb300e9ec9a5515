// ABOUTME: The full reconciliation pipeline, executed once per invocation
// ABOUTME: Extract from CRM and warehouse, select mismatches, publish CSV

use anyhow::Result;
use chrono::Utc;

use crate::config::Config;
use crate::crm::CrmClient;
use crate::publish::PublishReceipt;
use crate::{crm, publish, reconcile, warehouse};

/// Run the four pipeline stages in fixed order.
///
/// No stage is retried or skipped based on the others' results: either
/// the whole pipeline completes and exactly one object is written, or
/// the first error propagates and nothing is written.
pub async fn run(config: Config) -> Result<PublishReceipt> {
    tracing::info!("Extracting event records from CRM...");
    let crm_client = CrmClient::login(&config.crm).await?;
    let crm_table = crm::extract(&crm_client).await?;

    tracing::info!("Extracting event rows from warehouse...");
    let warehouse_table = warehouse::extract(&config.warehouse).await?;

    // Captured once so the staleness threshold is stable across all rows
    let now = Utc::now();
    let mismatches = reconcile::find_mismatches(&crm_table, &warehouse_table, now)?;

    tracing::info!("Publishing mismatch file to {}...", config.output_location());
    let store = publish::s3_store(&config.bucket)?;
    let receipt = publish::publish(store, &config.bucket, &config.output_key, &mismatches).await?;

    println!("Mismatch file uploaded to {}", receipt.location);
    Ok(receipt)
}
