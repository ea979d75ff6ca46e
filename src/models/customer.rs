//! Customer billing profiles as provisioned by the account service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Service classification driving which rate schedule applies.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "customer_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    Residential,
    Commercial,
    Industrial,
}

/// Full customer row. Contact email lives on the linked user account;
/// `user_id` is null for accounts imported before self-service signup.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_type: CustomerType,
    pub account_number: String,
    pub service_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_type_serialization() {
        let json = serde_json::to_string(&CustomerType::Industrial).unwrap();
        assert_eq!(json, "\"industrial\"");

        let parsed: CustomerType = serde_json::from_str("\"residential\"").unwrap();
        assert_eq!(parsed, CustomerType::Residential);
    }
}
