//! Metered water-usage records and their API projections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One daily meter reading as returned to customers. `is_estimated` marks
/// readings interpolated by the meter-data pipeline rather than read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    pub id: i32,
    pub customer_id: i32,
    pub usage_date: NaiveDate,
    pub daily_usage_ccf: f64,
    pub is_estimated: bool,
}

/// Usage record enriched with customer display fields for staff listings.
/// `customer_email` is null for customers without a linked login; the name
/// key disappears entirely if the customer row itself is gone.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UsageRecordWithCustomer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: UsageRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UsageRecord {
        UsageRecord {
            id: 7,
            customer_id: 3,
            usage_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            daily_usage_ccf: 4.2,
            is_estimated: false,
        }
    }

    #[test]
    fn usage_record_serialization() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["usage_date"], "2024-01-15");
        assert_eq!(json["daily_usage_ccf"], 4.2);
        assert_eq!(json["is_estimated"], false);
    }

    #[test]
    fn enriched_record_flattens_base_fields() {
        let enriched = UsageRecordWithCustomer {
            record: record(),
            customer_name: Some("Maple Street Residence".to_string()),
            customer_email: Some("walter@example.com".to_string()),
        };
        let json = serde_json::to_value(enriched).unwrap();
        assert_eq!(json["customer_id"], 3);
        assert_eq!(json["customer_name"], "Maple Street Residence");
        assert_eq!(json["customer_email"], "walter@example.com");
    }

    #[test]
    fn enriched_record_with_unlinked_account() {
        let enriched = UsageRecordWithCustomer {
            record: record(),
            customer_name: Some("Harborview Apartments".to_string()),
            customer_email: None,
        };
        let json = serde_json::to_value(enriched).unwrap();
        assert_eq!(json["customer_name"], "Harborview Apartments");
        assert!(json["customer_email"].is_null());
    }

    #[test]
    fn enriched_record_omits_name_for_missing_customer() {
        let enriched = UsageRecordWithCustomer {
            record: record(),
            customer_name: None,
            customer_email: None,
        };
        let json = serde_json::to_value(enriched).unwrap();
        assert!(json.get("customer_name").is_none());
        // email stays as an explicit null; only the name key is dropped
        assert!(json["customer_email"].is_null());
        // base fields still present
        assert_eq!(json["usage_date"], "2024-01-15");
    }
}
