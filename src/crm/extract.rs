// ABOUTME: CRM extraction stage - runs the fixed event query
// ABOUTME: Flattens the event-code relationship and normalizes timestamps to UTC

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::client::CrmClient;
use super::models::EventRecord;
use crate::table::{Cell, Table};

/// Fixed query over all contract event records, selecting the identifier,
/// the last-modified instant, the contract reference, and three fields
/// from the related event-code object.
pub const EVENT_QUERY: &str = "\
    SELECT \
        Id, \
        LastModifiedDate, \
        Contract__c, \
        Event_Code__r.Name, \
        Event_Code__r.Event_Type_Description__c, \
        Event_Code__r.Inactive__c \
    FROM Contract_Event__c";

/// Output column order. The relationship fields are flattened one level
/// into dotted column names.
const CRM_COLUMNS: [&str; 6] = [
    "Id",
    "LastModifiedDate",
    "Contract__c",
    "Event_Code__r.Name",
    "Event_Code__r.Event_Type_Description__c",
    "Event_Code__r.Inactive__c",
];

/// Run the fixed event query and produce the CRM table.
///
/// All pages are retrieved before this returns; any authentication or
/// query error aborts the run.
pub async fn extract(client: &CrmClient) -> Result<Table> {
    let records = client.query_all(EVENT_QUERY).await?;
    tracing::info!("Fetched {} event records from CRM", records.len());
    records_to_table(records)
}

/// Flatten records into a table with the fixed column order.
pub fn records_to_table(records: Vec<EventRecord>) -> Result<Table> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        rows.push(record_to_row(record)?);
    }
    Table::new(CRM_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
}

fn record_to_row(record: EventRecord) -> Result<Vec<Cell>> {
    let last_modified = match &record.last_modified_date {
        Some(raw) => Cell::Timestamp(parse_crm_timestamp(raw).with_context(|| {
            format!(
                "Invalid LastModifiedDate on record {}",
                record.id.as_deref().unwrap_or("<missing id>")
            )
        })?),
        None => Cell::Null,
    };

    let (code_name, code_description, code_inactive) = match record.event_code {
        Some(code) => (
            opt_text(code.name),
            opt_text(code.event_type_description),
            code.inactive.map(Cell::Bool).unwrap_or(Cell::Null),
        ),
        // Null relationship: all flattened fields are null
        None => (Cell::Null, Cell::Null, Cell::Null),
    };

    Ok(vec![
        opt_text(record.id),
        last_modified,
        opt_text(record.contract),
        code_name,
        code_description,
        code_inactive,
    ])
}

fn opt_text(value: Option<String>) -> Cell {
    value.map(Cell::Text).unwrap_or(Cell::Null)
}

/// Parse a CRM timestamp into UTC.
///
/// The API emits ISO 8601 with a `+0000`-style offset and millisecond
/// precision; RFC 3339 is accepted as well.
pub fn parse_crm_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let ts = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .with_context(|| format!("Unrecognized CRM timestamp '{}'", raw))?;
    Ok(ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::models::EventCodeRef;
    use chrono::TimeZone;

    fn record(id: &str, modified: &str) -> EventRecord {
        EventRecord {
            id: Some(id.to_string()),
            last_modified_date: Some(modified.to_string()),
            contract: Some("c01".to_string()),
            event_code: Some(EventCodeRef {
                name: Some("EC-1".to_string()),
                event_type_description: Some("Renewal".to_string()),
                inactive: Some(false),
            }),
        }
    }

    #[test]
    fn test_parse_crm_timestamp_api_offset_form() {
        let ts = parse_crm_timestamp("2024-01-01T12:30:00.000+0000").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_crm_timestamp_rfc3339() {
        let ts = parse_crm_timestamp("2024-01-01T12:30:00+00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_crm_timestamp_normalizes_offset_to_utc() {
        let ts = parse_crm_timestamp("2024-01-01T07:00:00.000-0500").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_crm_timestamp_rejects_garbage() {
        assert!(parse_crm_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_records_to_table_flattens_relationship() {
        let table = records_to_table(vec![record("a01", "2024-01-01T00:00:00.000+0000")]).unwrap();

        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.columns[3], "Event_Code__r.Name");
        assert_eq!(table.len(), 1);

        let row = &table.rows[0];
        assert_eq!(row[0], Cell::Text("a01".to_string()));
        assert_eq!(
            row[1],
            Cell::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(row[3], Cell::Text("EC-1".to_string()));
        assert_eq!(row[5], Cell::Bool(false));
    }

    #[test]
    fn test_records_to_table_null_relationship() {
        let mut rec = record("a02", "2024-01-01T00:00:00.000+0000");
        rec.event_code = None;
        rec.contract = None;

        let table = records_to_table(vec![rec]).unwrap();
        let row = &table.rows[0];
        assert_eq!(row[2], Cell::Null);
        assert_eq!(row[3], Cell::Null);
        assert_eq!(row[4], Cell::Null);
        assert_eq!(row[5], Cell::Null);
    }

    #[test]
    fn test_records_to_table_missing_timestamp_is_null() {
        let mut rec = record("a03", "unused");
        rec.last_modified_date = None;

        let table = records_to_table(vec![rec]).unwrap();
        assert_eq!(table.rows[0][1], Cell::Null);
    }

    #[test]
    fn test_records_to_table_bad_timestamp_fails() {
        let rec = record("a04", "not-a-timestamp");
        let err = records_to_table(vec![rec]).unwrap_err().to_string();
        assert!(err.contains("a04"), "error should name the record: {err}");
    }
}
