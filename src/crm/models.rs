// ABOUTME: Data structures for the CRM query wire format
// ABOUTME: Deserialized from the REST query endpoint's JSON responses

use serde::Deserialize;

/// One page of query results. `done` is false while more pages remain,
/// in which case `next_records_url` holds the cursor for the next page.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "totalSize")]
    pub total_size: i64,
    pub done: bool,
    #[serde(rename = "nextRecordsUrl")]
    pub next_records_url: Option<String>,
    pub records: Vec<EventRecord>,
}

/// A contract event record. Every field is optional on the wire; absent
/// fields become null cells downstream. The per-record `attributes`
/// metadata object is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Id")]
    pub id: Option<String>,
    #[serde(rename = "LastModifiedDate")]
    pub last_modified_date: Option<String>,
    #[serde(rename = "Contract__c")]
    pub contract: Option<String>,
    /// Related event-code object, flattened one level by the extractor.
    #[serde(rename = "Event_Code__r")]
    pub event_code: Option<EventCodeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventCodeRef {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Event_Type_Description__c")]
    pub event_type_description: Option<String>,
    #[serde(rename = "Inactive__c")]
    pub inactive: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_page() {
        let body = r#"{
            "totalSize": 2,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01g000000000001-2000",
            "records": [
                {
                    "attributes": {"type": "Contract_Event__c", "url": "/services/data/v59.0/sobjects/Contract_Event__c/a01"},
                    "Id": "a01",
                    "LastModifiedDate": "2024-01-01T00:00:00.000+0000",
                    "Contract__c": "c01",
                    "Event_Code__r": {
                        "attributes": {"type": "Event_Code__c", "url": "/services/data/v59.0/sobjects/Event_Code__c/e01"},
                        "Name": "EC-1",
                        "Event_Type_Description__c": "Renewal",
                        "Inactive__c": false
                    }
                },
                {
                    "attributes": {"type": "Contract_Event__c", "url": "/services/data/v59.0/sobjects/Contract_Event__c/a02"},
                    "Id": "a02",
                    "LastModifiedDate": "2024-01-02T00:00:00.000+0000",
                    "Contract__c": null,
                    "Event_Code__r": null
                }
            ]
        }"#;

        let page: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_size, 2);
        assert!(!page.done);
        assert!(page.next_records_url.is_some());
        assert_eq!(page.records.len(), 2);

        let first = &page.records[0];
        assert_eq!(first.id.as_deref(), Some("a01"));
        let code = first.event_code.as_ref().unwrap();
        assert_eq!(code.name.as_deref(), Some("EC-1"));
        assert_eq!(code.inactive, Some(false));

        let second = &page.records[1];
        assert!(second.contract.is_none());
        assert!(second.event_code.is_none());
    }

    #[test]
    fn test_parse_final_page_without_cursor() {
        let body = r#"{"totalSize": 0, "done": true, "records": []}"#;
        let page: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(page.done);
        assert!(page.next_records_url.is_none());
        assert!(page.records.is_empty());
    }
}
