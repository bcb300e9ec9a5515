// ABOUTME: In-memory tabular data model shared by both extractors
// ABOUTME: Provides typed cells, column lookup, and full outer join

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A single typed value in a table.
///
/// `Null` is a first-class value: both extractors produce it for absent
/// fields, and the reconciler's three-valued comparisons depend on it
/// being distinguishable from every concrete value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Render the cell as a CSV field. Null becomes an empty field,
    /// timestamps are RFC 3339 with an explicit +00:00 offset.
    pub fn csv_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Decimal(d) => d.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Date(d) => d.to_string(),
            Cell::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }

    /// Join key derived from the cell, or None for null keys.
    /// Null keys never participate in a match.
    fn join_key(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.csv_field())
        }
    }
}

/// A transient table: named columns plus rows of cells.
///
/// Both extractors produce one of these per run and discard it afterwards.
/// There is no persistence and no identity beyond the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table, validating that every row matches the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                bail!(
                    "Row {} has {} cells but the table has {} columns",
                    i,
                    row.len(),
                    columns.len()
                );
            }
        }
        Ok(Self { columns, rows })
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Full outer join of two tables on the given key columns.
///
/// Output columns are the left table's columns followed by the right
/// table's columns. Keys present on both sides are joined (cartesian on
/// duplicate keys, standard outer-join semantics); keys present on only
/// one side are retained with nulls filled for the missing side. Rows
/// whose key cell is null never match and are kept as unmatched.
///
/// Row order: left rows in input order, then unmatched right rows in
/// input order.
pub fn outer_join(left: &Table, right: &Table, left_key: &str, right_key: &str) -> Result<Table> {
    let li = left
        .column_index(left_key)
        .ok_or_else(|| anyhow::anyhow!("Left table has no column '{}'", left_key))?;
    let ri = right
        .column_index(right_key)
        .ok_or_else(|| anyhow::anyhow!("Right table has no column '{}'", right_key))?;

    let mut columns = left.columns.clone();
    columns.extend(right.columns.iter().cloned());

    // Index right rows by join key
    let mut right_index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in right.rows.iter().enumerate() {
        if let Some(key) = row[ri].join_key() {
            right_index.entry(key).or_default().push(idx);
        }
    }

    let left_width = left.columns.len();
    let right_width = right.columns.len();
    let mut matched = vec![false; right.rows.len()];
    let mut rows = Vec::with_capacity(left.rows.len().max(right.rows.len()));

    for lrow in &left.rows {
        let matches = lrow[li].join_key().and_then(|k| right_index.get(&k));
        match matches {
            Some(indices) => {
                for &idx in indices {
                    matched[idx] = true;
                    let mut joined = lrow.clone();
                    joined.extend(right.rows[idx].iter().cloned());
                    rows.push(joined);
                }
            }
            None => {
                let mut joined = lrow.clone();
                joined.extend(std::iter::repeat(Cell::Null).take(right_width));
                rows.push(joined);
            }
        }
    }

    for (idx, rrow) in right.rows.iter().enumerate() {
        if !matched[idx] {
            let mut joined: Vec<Cell> = std::iter::repeat(Cell::Null).take(left_width).collect();
            joined.extend(rrow.iter().cloned());
            rows.push(joined);
        }
    }

    Table::new(columns, rows)
}
