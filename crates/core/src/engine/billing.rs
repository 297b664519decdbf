//! Deposit, payment-chasing, and work-gating rules.
//!
//! The gates are strict boolean predicates: there is no partial or soft state.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::account::{AccountStanding, JobBooking, VariationRequest};
use crate::engine::config::{ChaseStep, EngineConfig};
use crate::numeric::{clamp_decimal, round_whole, DEPOSIT_TOTAL_MAX};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedChaseStep {
    pub day: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub due_on: NaiveDate,
}

/// Deposit owed on a job total, in whole currency units.
pub fn deposit_amount(config: &EngineConfig, total: Decimal) -> Decimal {
    let total = clamp_decimal(total, Decimal::ZERO, DEPOSIT_TOTAL_MAX);
    let percentage = clamp_decimal(
        config.business_rules.deposit_percentage_default,
        Decimal::ZERO,
        Decimal::ONE,
    );
    round_whole(total * percentage)
}

pub fn payment_chase_schedule(config: &EngineConfig) -> Vec<ChaseStep> {
    config.payment_chasing.schedule.clone()
}

/// Resolves each configured reminder to a calendar date counted from the invoice date.
pub fn dated_chase_schedule(config: &EngineConfig, invoice_date: NaiveDate) -> Vec<DatedChaseStep> {
    config
        .payment_chasing
        .schedule
        .iter()
        .map(|step| DatedChaseStep {
            day: step.day,
            kind: step.kind.clone(),
            due_on: invoice_date
                .checked_add_days(Days::new(u64::from(step.day)))
                .unwrap_or(NaiveDate::MAX),
        })
        .collect()
}

pub fn should_block_new_work(config: &EngineConfig, account: &AccountStanding) -> bool {
    config.business_rules.block_new_work_if_overdue && account.is_overdue
}

/// No deposit, no scheduling.
pub fn can_schedule_job(job: &JobBooking) -> bool {
    job.deposit_paid
}

/// No approval, no variation work.
pub fn can_do_variation_work(variation: &VariationRequest) -> bool {
    variation.approved
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{
        can_do_variation_work, can_schedule_job, dated_chase_schedule, deposit_amount,
        payment_chase_schedule, should_block_new_work,
    };
    use crate::domain::account::{AccountStanding, JobBooking, VariationRequest};
    use crate::engine::config::EngineConfig;

    fn config_with(block_overdue: bool, deposit: &str) -> EngineConfig {
        let raw = format!(
            r#"{{
                "business_rules": {{
                    "supported_services": ["excavation"],
                    "deposit_percentage_default": {deposit},
                    "block_new_work_if_overdue": {block_overdue}
                }},
                "pricing_engine": {{ "base_rates": {{ "excavation": 110 }} }},
                "payment_chasing": {{ "schedule": [
                    {{ "day": 7, "type": "reminder" }},
                    {{ "day": 14, "type": "final_notice" }}
                ] }}
            }}"#
        );
        EngineConfig::from_json_str(&raw, "fixture").expect("fixture config should load")
    }

    #[test]
    fn deposit_is_percentage_of_total_rounded_to_whole_units() {
        let config = config_with(true, "0.2");
        assert_eq!(deposit_amount(&config, dec!(2000)), dec!(400));
        assert_eq!(deposit_amount(&config, dec!(1002.5)), dec!(201));
        assert_eq!(deposit_amount(&config, dec!(-50)), Decimal::ZERO);
    }

    #[test]
    fn deposit_total_is_clamped_to_upper_bound() {
        let config = config_with(true, "0.5");
        assert_eq!(deposit_amount(&config, dec!(4000000000000)), dec!(500000000000));
    }

    #[test]
    fn chase_schedule_is_returned_verbatim_and_can_be_dated() {
        let config = config_with(true, "0.2");
        let schedule = payment_chase_schedule(&config);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].day, 7);
        assert_eq!(schedule[1].kind, "final_notice");

        let invoice_date = NaiveDate::from_ymd_opt(2026, 1, 28).expect("valid date");
        let dated = dated_chase_schedule(&config, invoice_date);
        assert_eq!(dated[0].due_on, NaiveDate::from_ymd_opt(2026, 2, 4).expect("valid date"));
        assert_eq!(dated[1].due_on, NaiveDate::from_ymd_opt(2026, 2, 11).expect("valid date"));
    }

    #[test]
    fn overdue_accounts_are_blocked_only_when_flag_is_set() {
        let overdue = AccountStanding { is_overdue: true };
        let current = AccountStanding { is_overdue: false };

        assert!(should_block_new_work(&config_with(true, "0.2"), &overdue));
        assert!(!should_block_new_work(&config_with(true, "0.2"), &current));
        assert!(!should_block_new_work(&config_with(false, "0.2"), &overdue));
    }

    #[test]
    fn scheduling_and_variation_gates_are_strict() {
        assert!(can_schedule_job(&JobBooking { deposit_paid: true }));
        assert!(!can_schedule_job(&JobBooking::default()));
        assert!(can_do_variation_work(&VariationRequest { approved: true }));
        assert!(!can_do_variation_work(&VariationRequest::default()));
    }
}
