//! Caller roles for access control.

use serde::{Deserialize, Serialize};

/// Role carried in access-token claims. Mirrors the `user_role` Postgres
/// enum owned by the account service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
    Billing,
}

impl UserRole {
    /// Staff roles have cross-customer visibility.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Billing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_serialization() {
        let role = UserRole::Billing;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"billing\"");

        let parsed: UserRole = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(parsed, UserRole::Customer);
    }

    #[test]
    fn staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Billing.is_staff());
        assert!(!UserRole::Customer.is_staff());
    }
}
