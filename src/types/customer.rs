//! Customer data structures for churn prediction

use serde::{Deserialize, Serialize};

/// A single customer row submitted for churn scoring.
///
/// Every feature field is optional on the wire: missing values are imputed by
/// the fitted preprocessor, never rejected. Only `customer_id` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Unique customer identifier within a batch
    pub customer_id: String,

    /// Months since signup
    pub tenure: Option<f64>,

    /// Current monthly charge
    pub monthly_charges: Option<f64>,

    /// Lifetime charges to date
    pub total_charges: Option<f64>,

    /// Average session length in minutes
    pub avg_session_length: Option<f64>,

    /// Average sessions per month
    pub avg_session_count_monthly: Option<f64>,

    /// Days since the customer was last active
    pub days_since_last_activity: Option<f64>,

    /// Support tickets opened
    pub support_tickets_count: Option<f64>,

    /// Items purchased in the last six months
    pub items_purchased_6m: Option<f64>,

    /// Average purchase value
    pub avg_purchase_value: Option<f64>,

    /// Contract type: "Monthly", "One-year", or "Two-year"
    pub contract_type: Option<String>,

    /// Payment method: "Credit card", "Bank transfer", "Electronic check",
    /// or "Mailed check"
    pub payment_method: Option<String>,

    /// Subscription tier: "Basic", "Standard", or "Premium"
    pub subscription_tier: Option<String>,

    /// Whether the customer pays for premium support
    pub has_premium_support: Option<bool>,

    /// Whether the account is on a family plan
    pub has_family_plan: Option<bool>,

    /// Whether the customer uses multiple devices
    pub has_multiple_devices: Option<bool>,
}

impl CustomerRecord {
    /// Create an empty record with only the identifier set.
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            tenure: None,
            monthly_charges: None,
            total_charges: None,
            avg_session_length: None,
            avg_session_count_monthly: None,
            days_since_last_activity: None,
            support_tickets_count: None,
            items_purchased_6m: None,
            avg_purchase_value: None,
            contract_type: None,
            payment_method: None,
            subscription_tier: None,
            has_premium_support: None,
            has_family_plan: None,
            has_multiple_devices: None,
        }
    }
}

/// A customer row with its churn label, used only during training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledCustomer {
    #[serde(flatten)]
    pub record: CustomerRecord,

    /// 0 = retained, 1 = churned
    pub churned: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_serialization() {
        let mut customer = CustomerRecord::new("CUST-00001");
        customer.tenure = Some(12.0);
        customer.contract_type = Some("Monthly".to_string());
        customer.has_family_plan = Some(true);

        let json = serde_json::to_string(&customer).unwrap();
        let deserialized: CustomerRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(customer.customer_id, deserialized.customer_id);
        assert_eq!(deserialized.tenure, Some(12.0));
        assert_eq!(deserialized.contract_type.as_deref(), Some("Monthly"));
        assert_eq!(deserialized.has_family_plan, Some(true));
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let json = r#"{"customer_id": "CUST-00002", "tenure": 24.0}"#;
        let customer: CustomerRecord = serde_json::from_str(json).unwrap();

        assert_eq!(customer.customer_id, "CUST-00002");
        assert_eq!(customer.tenure, Some(24.0));
        assert!(customer.monthly_charges.is_none());
        assert!(customer.payment_method.is_none());
        assert!(customer.has_premium_support.is_none());
    }

    #[test]
    fn test_labeled_customer_flattens_record() {
        let json = r#"{"customer_id": "CUST-00003", "tenure": 6.0, "churned": 1}"#;
        let labeled: LabeledCustomer = serde_json::from_str(json).unwrap();

        assert_eq!(labeled.record.customer_id, "CUST-00003");
        assert_eq!(labeled.churned, 1);
    }
}
