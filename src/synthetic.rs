//! Synthetic customer data for training runs and tests.
//!
//! Mirrors the marginal distributions of the production synthetic set:
//! gamma-distributed tenure and purchase value, normal charges and session
//! lengths, Poisson counts, exponential inactivity gaps, weighted categorical
//! draws, and an independent 70/30 retain/churn label.

use crate::types::{CustomerRecord, LabeledCustomer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic synthetic dataset generator.
pub struct SyntheticDataGenerator {
    rng: StdRng,
    counter: u64,
}

impl SyntheticDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            counter: 0,
        }
    }

    /// Generate `n` labeled rows.
    pub fn generate(&mut self, n: usize) -> Vec<LabeledCustomer> {
        (0..n).map(|_| self.generate_row()).collect()
    }

    fn generate_row(&mut self) -> LabeledCustomer {
        self.counter += 1;
        let mut record = CustomerRecord::new(format!("CUST-{:05}", self.counter));

        record.tenure = Some(self.gamma2(10.0));
        record.monthly_charges = Some(self.normal(65.0, 30.0));
        record.total_charges = Some(self.normal(1000.0, 500.0));
        record.avg_session_length = Some(self.normal(25.0, 10.0));
        record.avg_session_count_monthly = Some(self.poisson(15.0));
        record.days_since_last_activity = Some(self.exponential(7.0));
        record.support_tickets_count = Some(self.poisson(1.0));
        record.items_purchased_6m = Some(self.poisson(3.0));
        record.avg_purchase_value = Some(self.gamma2(20.0));

        record.contract_type = Some(
            self.weighted_choice(&[("Monthly", 0.6), ("One-year", 0.3), ("Two-year", 0.1)]),
        );
        record.payment_method = Some(self.weighted_choice(&[
            ("Credit card", 0.25),
            ("Bank transfer", 0.25),
            ("Electronic check", 0.25),
            ("Mailed check", 0.25),
        ]));
        record.subscription_tier = Some(self.weighted_choice(&[
            ("Basic", 0.3),
            ("Standard", 0.5),
            ("Premium", 0.2),
        ]));
        record.has_premium_support = Some(self.rng.gen_bool(0.2));
        record.has_family_plan = Some(self.rng.gen_bool(0.3));
        record.has_multiple_devices = Some(self.rng.gen_bool(0.6));

        LabeledCustomer {
            record,
            churned: u8::from(self.rng.gen_bool(0.3)),
        }
    }

    /// Gamma(shape = 2, scale): sum of two exponentials.
    fn gamma2(&mut self, scale: f64) -> f64 {
        self.exponential(scale) + self.exponential(scale)
    }

    fn exponential(&mut self, mean: f64) -> f64 {
        let u: f64 = 1.0 - self.rng.gen::<f64>();
        -mean * u.ln()
    }

    /// Box-Muller transform.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Knuth's method; fine for the small rates used here.
    fn poisson(&mut self, lambda: f64) -> f64 {
        let limit = (-lambda).exp();
        let mut k = 0u64;
        let mut product: f64 = 1.0;
        loop {
            product *= self.rng.gen::<f64>();
            if product <= limit {
                return k as f64;
            }
            k += 1;
        }
    }

    fn weighted_choice(&mut self, choices: &[(&str, f64)]) -> String {
        let draw: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (value, weight) in choices {
            cumulative += weight;
            if draw < cumulative {
                return value.to_string();
            }
        }
        choices.last().map(|(v, _)| v.to_string()).unwrap_or_default()
    }
}

/// The five illustrative customers the dashboard scores.
pub fn dashboard_sample_rows() -> Vec<CustomerRecord> {
    let tenure = [12.0, 24.0, 36.0, 48.0, 60.0];
    let monthly_charges = [50.0, 70.0, 90.0, 110.0, 130.0];
    let total_charges = [600.0, 1680.0, 3240.0, 5280.0, 7800.0];
    let avg_session_length = [30.0, 40.0, 35.0, 50.0, 60.0];
    let avg_session_count_monthly = [10.0, 15.0, 12.0, 18.0, 20.0];
    let days_since_last_activity = [5.0, 10.0, 7.0, 15.0, 20.0];
    let support_tickets_count = [1.0, 2.0, 1.0, 3.0, 4.0];
    let items_purchased_6m = [2.0, 5.0, 3.0, 6.0, 7.0];
    let avg_purchase_value = [100.0, 200.0, 150.0, 300.0, 400.0];
    let contract_type = ["Monthly", "One-year", "Two-year", "Monthly", "One-year"];
    let payment_method = [
        "Credit card",
        "Bank transfer",
        "Electronic check",
        "Mailed check",
        "Credit card",
    ];
    let subscription_tier = ["Basic", "Standard", "Premium", "Standard", "Premium"];
    let has_premium_support = [false, true, false, true, true];
    let has_family_plan = [true, false, true, false, true];
    let has_multiple_devices = [true, true, false, false, true];

    (0..5)
        .map(|i| {
            let mut record = CustomerRecord::new(format!("CUST-{:05}", i + 1));
            record.tenure = Some(tenure[i]);
            record.monthly_charges = Some(monthly_charges[i]);
            record.total_charges = Some(total_charges[i]);
            record.avg_session_length = Some(avg_session_length[i]);
            record.avg_session_count_monthly = Some(avg_session_count_monthly[i]);
            record.days_since_last_activity = Some(days_since_last_activity[i]);
            record.support_tickets_count = Some(support_tickets_count[i]);
            record.items_purchased_6m = Some(items_purchased_6m[i]);
            record.avg_purchase_value = Some(avg_purchase_value[i]);
            record.contract_type = Some(contract_type[i].to_string());
            record.payment_method = Some(payment_method[i].to_string());
            record.subscription_tier = Some(subscription_tier[i].to_string());
            record.has_premium_support = Some(has_premium_support[i]);
            record.has_family_plan = Some(has_family_plan[i]);
            record.has_multiple_devices = Some(has_multiple_devices[i]);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_reproducible() {
        let a = SyntheticDataGenerator::new(42).generate(50);
        let b = SyntheticDataGenerator::new(42).generate(50);

        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.record.customer_id, y.record.customer_id);
            assert_eq!(x.record.tenure, y.record.tenure);
            assert_eq!(x.record.contract_type, y.record.contract_type);
            assert_eq!(x.churned, y.churned);
        }
    }

    #[test]
    fn test_generated_rows_are_fully_populated() {
        let rows = SyntheticDataGenerator::new(1).generate(100);

        assert_eq!(rows.len(), 100);
        assert_eq!(rows[0].record.customer_id, "CUST-00001");
        for row in &rows {
            assert!(row.record.tenure.unwrap() >= 0.0);
            assert!(row.record.days_since_last_activity.unwrap() >= 0.0);
            assert!(row.record.contract_type.is_some());
            assert!(row.churned <= 1);
        }
    }

    #[test]
    fn test_class_balance_is_roughly_70_30() {
        let rows = SyntheticDataGenerator::new(42).generate(1000);
        let churned = rows.iter().filter(|r| r.churned == 1).count();

        assert!((200..400).contains(&churned), "churned = {churned}");
    }

    #[test]
    fn test_dashboard_rows_match_sample() {
        let rows = dashboard_sample_rows();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].customer_id, "CUST-00001");
        assert_eq!(rows[0].tenure, Some(12.0));
        assert_eq!(rows[0].monthly_charges, Some(50.0));
        assert_eq!(rows[2].contract_type.as_deref(), Some("Two-year"));
        assert_eq!(rows[4].has_multiple_devices, Some(true));
    }
}
