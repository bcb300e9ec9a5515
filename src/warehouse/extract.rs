// ABOUTME: Warehouse extraction stage - runs the fixed analytical view query
// ABOUTME: Excludes soft-deleted rows and inverts the active flag in SQL

use anyhow::{Context, Result};

use super::connect;
use super::convert::row_to_cells;
use crate::config::WarehouseConfig;
use crate::table::Table;

/// Fixed statement over the analytical view.
///
/// Soft-deleted rows are filtered at the source. The CASE expression
/// inverts the active indicator into an inactive indicator; it has no
/// ELSE arm, so a null input propagates to a null output rather than
/// defaulting to active or inactive.
pub const WAREHOUSE_QUERY: &str = "\
    SELECT contracteventid,
           deletedindicator,
           contracteventname,
           contractid,
           contracteventcode,
           contracteventcodedescription,
           CASE
               WHEN contracteventcodeactiveindicator IS FALSE THEN TRUE
               WHEN contracteventcodeactiveindicator IS TRUE THEN FALSE
           END AS eventcodeinactiveindicator,
           contracteventcomments,
           defaultstatuscode,
           eventdate,
           postexecutionaddendumreasoncodes,
           terminationreasoncode,
           contracteventlastupdatedatetimegmt
    FROM analytics_schema.contract_events_view
    WHERE deletedindicator = false";

/// Run the fixed query and produce the warehouse table.
///
/// The column header comes from the statement metadata, so an empty
/// result still yields a well-formed table. The client is owned by this
/// function and dropped on every exit path, which releases the
/// connection deterministically.
pub async fn extract(config: &WarehouseConfig) -> Result<Table> {
    let client = connect(config).await?;

    let statement = client
        .prepare(WAREHOUSE_QUERY)
        .await
        .context("Failed to prepare warehouse query")?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let rows = client
        .query(&statement, &[])
        .await
        .context("Warehouse query failed")?;
    tracing::info!("Fetched {} event rows from warehouse", rows.len());

    let mut data = Vec::with_capacity(rows.len());
    for row in &rows {
        data.push(row_to_cells(row)?);
    }

    Table::new(columns, data)
}
