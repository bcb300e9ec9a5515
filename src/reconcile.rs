// ABOUTME: Reconciler - joins the CRM and warehouse tables and selects mismatches
// ABOUTME: Uses explicit three-valued comparisons so nulls always route to exclusion

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};

use crate::table::{outer_join, Cell, Table};

/// CRM timestamps newer than this window are not yet considered
/// mismatched, to tolerate replication lag into the warehouse.
pub const STALENESS_HOURS: i64 = 5;

/// Join key on the CRM side.
pub const CRM_KEY: &str = "Id";
/// Join key on the warehouse side.
pub const WAREHOUSE_KEY: &str = "contracteventid";
/// Last-modified instant on the CRM side.
pub const CRM_TIMESTAMP: &str = "LastModifiedDate";
/// Last-updated instant on the warehouse side.
pub const WAREHOUSE_TIMESTAMP: &str = "contracteventlastupdatedatetimegmt";

/// Result of a three-valued comparison. A comparison touching a null
/// operand is `Unknown`, and `Unknown` never selects a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn is_true(self) -> bool {
        self == Truth::True
    }
}

/// Three-valued inequality: `Unknown` if either cell is null, otherwise
/// `True` when the values differ. Two nulls are `Unknown`, not equal.
pub fn cells_differ(a: &Cell, b: &Cell) -> Truth {
    if a.is_null() || b.is_null() {
        Truth::Unknown
    } else if a == b {
        Truth::False
    } else {
        Truth::True
    }
}

/// Three-valued "strictly before": `Unknown` for null or non-timestamp
/// cells, otherwise a strict comparison against the threshold.
pub fn timestamp_before(cell: &Cell, threshold: DateTime<Utc>) -> Truth {
    match cell {
        Cell::Timestamp(ts) if *ts < threshold => Truth::True,
        Cell::Timestamp(_) => Truth::False,
        _ => Truth::Unknown,
    }
}

/// Outer-join the two tables and select the mismatched rows.
///
/// A row is a mismatch when the two timestamps definitely differ AND the
/// CRM timestamp is definitely older than `now` minus the staleness
/// window (strict `<` at the boundary). `now` is captured once by the
/// caller, so the threshold is stable across all rows and re-running
/// with identical inputs and the same `now` selects identical rows.
///
/// Output columns are the CRM columns followed by the warehouse columns.
pub fn find_mismatches(crm: &Table, warehouse: &Table, now: DateTime<Utc>) -> Result<Table> {
    let joined = outer_join(crm, warehouse, CRM_KEY, WAREHOUSE_KEY)?;

    let crm_ts = joined
        .column_index(CRM_TIMESTAMP)
        .ok_or_else(|| anyhow!("Joined table has no column '{}'", CRM_TIMESTAMP))?;
    let warehouse_ts = joined
        .column_index(WAREHOUSE_TIMESTAMP)
        .ok_or_else(|| anyhow!("Joined table has no column '{}'", WAREHOUSE_TIMESTAMP))?;

    let cutoff = now - Duration::hours(STALENESS_HOURS);

    let rows: Vec<_> = joined
        .rows
        .into_iter()
        .filter(|row| {
            cells_differ(&row[warehouse_ts], &row[crm_ts]).is_true()
                && timestamp_before(&row[crm_ts], cutoff).is_true()
        })
        .collect();

    tracing::info!(
        "Selected {} mismatched rows (cutoff {})",
        rows.len(),
        cutoff.to_rfc3339()
    );

    Table::new(joined.columns, rows)
}
