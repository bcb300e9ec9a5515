// ABOUTME: Postgres wire value to Cell conversion for warehouse rows
// ABOUTME: Maps column types explicitly and fails fast on unsupported ones

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tokio_postgres::types::Type;
use tokio_postgres::Row;

use crate::table::Cell;

/// Convert one warehouse row into cells, one per column.
pub fn row_to_cells(row: &Row) -> Result<Vec<Cell>> {
    let mut cells = Vec::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        let cell = value_to_cell(row, idx, column.type_())
            .with_context(|| format!("Failed to convert warehouse column '{}'", column.name()))?;
        cells.push(cell);
    }
    Ok(cells)
}

/// Convert a single column value by its declared type.
///
/// The warehouse view is a fixed contract, so an unexpected column type
/// is an error rather than a silently dropped or stringified value.
/// Naive timestamps are stored in GMT and get UTC attached; timestamptz
/// values are already instant-typed.
fn value_to_cell(row: &Row, idx: usize, ty: &Type) -> Result<Cell> {
    let cell = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Cell::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(|v| Cell::Int(v as i64))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(|v| Cell::Int(v as i64))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Cell::Int)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(|v| Cell::Float(v as f64))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Cell::Float)
    } else if *ty == Type::NUMERIC {
        row.try_get::<_, Option<Decimal>>(idx)?.map(Cell::Decimal)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)?.map(Cell::Text)
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(idx)?.map(Cell::Date)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|naive| Cell::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(Cell::Timestamp)
    } else {
        bail!("Unsupported warehouse column type '{}'", ty);
    };

    Ok(cell.unwrap_or(Cell::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_naive_gmt_timestamp_gets_utc_attached() {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        let ts = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());
    }
}
