// ABOUTME: Publisher - serializes the mismatch table to CSV
// ABOUTME: Writes the payload to object storage, overwriting the previous run

use anyhow::{Context, Result};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;

use crate::table::Table;

/// Confirmation of a published mismatch file.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    /// s3://bucket/key location of the written object.
    pub location: String,
    /// Number of data rows in the file (header excluded).
    pub rows: usize,
}

/// Serialize a table to CSV: header row, comma-delimited, standard
/// quoting for fields containing the delimiter, UTF-8, null cells empty.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&table.columns)
        .context("Failed to write CSV header")?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.csv_field()))
            .context("Failed to write CSV row")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))
}

/// Build an S3 store for the destination bucket. Credentials and region
/// come from the ambient AWS environment.
pub fn s3_store(bucket: &str) -> Result<Arc<dyn ObjectStore>> {
    let store = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .build()
        .context("Failed to build object storage client")?;
    Ok(Arc::new(store))
}

/// Write the table to `key` in the given store as CSV.
///
/// The object is overwritten wholesale; overlapping runs are last writer
/// wins by design. Write errors propagate and fail the run.
pub async fn publish(
    store: Arc<dyn ObjectStore>,
    bucket: &str,
    key: &str,
    table: &Table,
) -> Result<PublishReceipt> {
    let payload = to_csv(table)?;
    let path = Path::from(key);

    store
        .put(&path, PutPayload::from(payload))
        .await
        .with_context(|| format!("Failed to write s3://{}/{}", bucket, key))?;

    let receipt = PublishReceipt {
        location: format!("s3://{}/{}", bucket, key),
        rows: table.len(),
    };
    tracing::info!("Uploaded {} rows to {}", receipt.rows, receipt.location);

    Ok(receipt)
}
