pub mod billing;
pub mod config;
pub mod pricing;
pub mod rules;

use serde::{Deserialize, Serialize};

use crate::domain::lead::Lead;

use self::{
    config::EngineConfig,
    pricing::{DeterministicPricingEngine, QuoteOutcome, QuotePricingEngine},
    rules::{DeterministicRulesEngine, LeadDecision, LeadRulesEngine},
};

/// Decision for one lead plus, when the lead was allowed, its quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAssessment {
    pub decision: LeadDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteOutcome>,
}

pub type DeterministicLeadEngine = LeadEngine<DeterministicRulesEngine, DeterministicPricingEngine>;

pub struct LeadEngine<R = DeterministicRulesEngine, P = DeterministicPricingEngine> {
    rules_engine: R,
    pricing_engine: P,
}

impl<R, P> LeadEngine<R, P> {
    pub fn new(rules_engine: R, pricing_engine: P) -> Self {
        Self { rules_engine, pricing_engine }
    }
}

impl Default for DeterministicLeadEngine {
    fn default() -> Self {
        Self::new(DeterministicRulesEngine, DeterministicPricingEngine)
    }
}

impl<R, P> LeadEngine<R, P>
where
    R: LeadRulesEngine,
    P: QuotePricingEngine,
{
    pub fn evaluate(&self, config: &EngineConfig, lead: &Lead) -> LeadDecision {
        self.rules_engine.evaluate(config, lead)
    }

    /// Prices a lead without consulting the decline rules.
    pub fn quote(&self, config: &EngineConfig, lead: &Lead) -> QuoteOutcome {
        self.pricing_engine.quote(config, lead)
    }

    pub fn assess(&self, config: &EngineConfig, lead: &Lead) -> LeadAssessment {
        let decision = self.evaluate(config, lead);
        let quote = decision.is_allowed().then(|| self.quote(config, lead));
        LeadAssessment { decision, quote }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::domain::lead::{Lead, ServiceId};
    use crate::engine::{
        config::EngineConfig,
        pricing::{QuoteOutcome, QuotePricingEngine, QuoteUnavailable},
        rules::{DeterministicRulesEngine, LeadDecision},
        DeterministicLeadEngine, LeadEngine,
    };

    fn config_fixture() -> EngineConfig {
        EngineConfig::from_json_str(
            r#"{
                "business_rules": {
                    "supported_services": ["colorbond_fencing"],
                    "minimum_job_value": 1500
                },
                "pricing_engine": { "base_rates": { "colorbond_fencing": 80 } }
            }"#,
            "fixture",
        )
        .expect("fixture config should load")
    }

    fn lead_fixture() -> Lead {
        Lead {
            service: ServiceId::new("colorbond_fencing"),
            budget: dec!(2000),
            qty: dec!(20),
            ..Lead::default()
        }
    }

    #[test]
    fn default_engine_quotes_allowed_leads() {
        let engine = DeterministicLeadEngine::default();
        let assessment = engine.assess(&config_fixture(), &lead_fixture());

        assert_eq!(assessment.decision, LeadDecision::Allowed);
        let quote = assessment.quote.expect("allowed lead should be quoted");
        assert_eq!(quote.priced().map(|range| range.raw), Some(dec!(1600)));
    }

    #[test]
    fn declined_leads_are_not_quoted_by_assess_but_can_be_priced_directly() {
        let engine = DeterministicLeadEngine::default();
        let lead = Lead { budget: dec!(100), ..lead_fixture() };
        let config = config_fixture();

        let assessment = engine.assess(&config, &lead);
        assert!(!assessment.decision.is_allowed());
        assert!(assessment.quote.is_none());
        assert!(engine.quote(&config, &lead).is_ok());
    }

    #[test]
    fn engine_accepts_substitute_pricing_engines() {
        struct NoRates;

        impl QuotePricingEngine for NoRates {
            fn quote(&self, _config: &EngineConfig, _lead: &Lead) -> QuoteOutcome {
                QuoteOutcome::Unavailable { reason: QuoteUnavailable::MissingBaseRate }
            }
        }

        let engine = LeadEngine::new(DeterministicRulesEngine, NoRates);
        let assessment = engine.assess(&config_fixture(), &lead_fixture());
        assert!(assessment.decision.is_allowed());
        assert_eq!(
            assessment.quote,
            Some(QuoteOutcome::Unavailable { reason: QuoteUnavailable::MissingBaseRate })
        );
    }
}
