use serde::{Deserialize, Serialize};

use crate::domain::category::Access;
use crate::domain::lead::Lead;
use crate::engine::config::EngineConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineRule {
    UnsupportedService,
    MinJobValue,
    TightAccessMin,
}

impl DeclineRule {
    pub fn id(&self) -> &'static str {
        match self {
            Self::UnsupportedService => "unsupported_service",
            Self::MinJobValue => "min_job_value",
            Self::TightAccessMin => "tight_access_min",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    AutoDecline,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclinedLead {
    pub rule_id: DeclineRule,
    pub action: DecisionAction,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LeadDecision {
    Allowed,
    Declined(DeclinedLead),
}

impl LeadDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn declined(&self) -> Option<&DeclinedLead> {
        match self {
            Self::Allowed => None,
            Self::Declined(declined) => Some(declined),
        }
    }
}

pub trait LeadRulesEngine: Send + Sync {
    fn evaluate(&self, config: &EngineConfig, lead: &Lead) -> LeadDecision;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicRulesEngine;

impl LeadRulesEngine for DeterministicRulesEngine {
    fn evaluate(&self, config: &EngineConfig, lead: &Lead) -> LeadDecision {
        evaluate_lead(config, lead)
    }
}

/// Applies the decline rules in priority order; the first rule that matches wins.
pub fn evaluate_lead(config: &EngineConfig, lead: &Lead) -> LeadDecision {
    let budget = lead.clamped_budget();
    let rules = &config.business_rules;

    let violated = if !config.is_service_supported(&lead.service) {
        Some(DeclineRule::UnsupportedService)
    } else if budget < rules.minimum_job_value {
        Some(DeclineRule::MinJobValue)
    } else if lead.access == Access::Tight && budget < rules.tight_access_minimum {
        Some(DeclineRule::TightAccessMin)
    } else {
        None
    };

    match violated {
        None => LeadDecision::Allowed,
        Some(rule) => LeadDecision::Declined(DeclinedLead {
            rule_id: rule,
            action: DecisionAction::AutoDecline,
            message: config.rule_message(rule).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{evaluate_lead, DeclineRule, LeadDecision};
    use crate::domain::category::Access;
    use crate::domain::lead::{Lead, ServiceId};
    use crate::engine::config::{EngineConfig, FALLBACK_RULE_MESSAGE};

    fn config_fixture() -> EngineConfig {
        EngineConfig::from_json_str(
            r#"{
                "business_rules": {
                    "supported_services": ["colorbond_fencing", "excavation"],
                    "minimum_job_value": 1500,
                    "tight_access_minimum": 3000
                },
                "pricing_engine": { "base_rates": { "colorbond_fencing": 80 } },
                "lead_filtering": { "rules": [
                    { "id": "min_job_value", "message": "Below our minimum job size." },
                    { "id": "tight_access_min", "message": "Tight access needs a bigger budget." }
                ] }
            }"#,
            "fixture",
        )
        .expect("fixture config should load")
    }

    fn lead(service: &str, budget: Decimal, access: Access) -> Lead {
        Lead {
            service: ServiceId::new(service),
            budget,
            qty: dec!(20),
            access,
            ..Lead::default()
        }
    }

    fn rule_of(decision: &LeadDecision) -> Option<DeclineRule> {
        decision.declined().map(|declined| declined.rule_id)
    }

    #[test]
    fn unsupported_service_wins_regardless_of_budget() {
        let config = config_fixture();
        let decision = evaluate_lead(&config, &lead("pressure_washing", dec!(50000), Access::Easy));
        assert_eq!(rule_of(&decision), Some(DeclineRule::UnsupportedService));

        let unknown = evaluate_lead(&config, &lead("", dec!(50000), Access::Easy));
        assert_eq!(rule_of(&unknown), Some(DeclineRule::UnsupportedService));
    }

    #[test]
    fn missing_rule_message_falls_back_to_generic_thanks() {
        let config = config_fixture();
        let decision = evaluate_lead(&config, &lead("pressure_washing", dec!(5000), Access::Easy));
        let declined = decision.declined().expect("declined");
        assert_eq!(declined.message, FALLBACK_RULE_MESSAGE);
    }

    #[test]
    fn budget_below_minimum_is_declined_with_configured_message() {
        let config = config_fixture();
        let decision = evaluate_lead(&config, &lead("excavation", dec!(1499.99), Access::Easy));
        let declined = decision.declined().expect("declined");
        assert_eq!(declined.rule_id, DeclineRule::MinJobValue);
        assert_eq!(declined.message, "Below our minimum job size.");
    }

    #[test]
    fn tight_access_requires_the_higher_minimum() {
        let config = config_fixture();
        let declined = evaluate_lead(&config, &lead("excavation", dec!(1500), Access::Tight));
        assert_eq!(rule_of(&declined), Some(DeclineRule::TightAccessMin));

        let allowed = evaluate_lead(&config, &lead("excavation", dec!(3000), Access::Tight));
        assert!(allowed.is_allowed());

        let restricted =
            evaluate_lead(&config, &lead("excavation", dec!(1500), Access::Restricted));
        assert!(restricted.is_allowed());
    }

    #[test]
    fn negative_budget_is_clamped_before_comparison() {
        let config = config_fixture();
        let decision = evaluate_lead(&config, &lead("excavation", dec!(-10), Access::Easy));
        assert_eq!(rule_of(&decision), Some(DeclineRule::MinJobValue));
    }

    #[test]
    fn decision_serializes_with_rule_id_and_action() {
        let config = config_fixture();
        let decision = evaluate_lead(&config, &lead("excavation", dec!(100), Access::Easy));
        let json = serde_json::to_value(&decision).expect("serialize decision");
        assert_eq!(json["outcome"], "declined");
        assert_eq!(json["rule_id"], "min_job_value");
        assert_eq!(json["action"], "auto_decline");

        let allowed = serde_json::to_value(LeadDecision::Allowed).expect("serialize allowed");
        assert_eq!(allowed["outcome"], "allowed");
    }
}
