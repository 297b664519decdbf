//! Turns one inbound message into a reply action.
//!
//! The orchestrator owns an extractor and, optionally, an engine bound to its
//! configuration. Without an engine every message is passed to a human.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use siteboss_core::engine::pricing::{DeterministicPricingEngine, QuotePricingEngine};
use siteboss_core::engine::rules::{DeterministicRulesEngine, LeadRulesEngine};
use siteboss_core::{
    EngineConfig, Lead, LeadAssessment, LeadDecision, LeadEngine, PriceRange, QuoteOutcome,
    QuoteUnavailable,
};
use tracing::info;

use crate::extraction::{BudgetSource, LeadExtractor};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplyAction {
    Decline { message: String },
    Range { message: String },
    Pass,
}

impl ReplyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decline { .. } => "decline",
            Self::Range { .. } => "range",
            Self::Pass => "pass",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Decline { message } | Self::Range { message } => Some(message),
            Self::Pass => None,
        }
    }
}

/// Why a message was handed over instead of answered automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassReason {
    EngineUnavailable,
    MissingService,
    MissingQuantity,
    UnsupportedService,
    MissingBaseRate,
}

impl PassReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EngineUnavailable => "engine_unavailable",
            Self::MissingService => "missing_service",
            Self::MissingQuantity => "missing_quantity",
            Self::UnsupportedService => "unsupported_service",
            Self::MissingBaseRate => "missing_base_rate",
        }
    }
}

impl From<QuoteUnavailable> for PassReason {
    fn from(reason: QuoteUnavailable) -> Self {
        match reason {
            QuoteUnavailable::UnsupportedService => Self::UnsupportedService,
            QuoteUnavailable::MissingBaseRate => Self::MissingBaseRate,
        }
    }
}

/// Everything the orchestrator saw and decided for one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionReport {
    pub lead: Lead,
    pub budget_source: BudgetSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<LeadAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_reason: Option<PassReason>,
    pub reply: ReplyAction,
}

pub type DeterministicReplyOrchestrator =
    ReplyOrchestrator<DeterministicRulesEngine, DeterministicPricingEngine>;

struct BoundEngine<R, P> {
    engine: LeadEngine<R, P>,
    config: Arc<EngineConfig>,
}

pub struct ReplyOrchestrator<R = DeterministicRulesEngine, P = DeterministicPricingEngine> {
    extractor: LeadExtractor,
    bound: Option<BoundEngine<R, P>>,
}

impl<R, P> ReplyOrchestrator<R, P> {
    pub fn new(engine: LeadEngine<R, P>, config: Arc<EngineConfig>) -> Self {
        Self {
            extractor: LeadExtractor::for_config(&config),
            bound: Some(BoundEngine { engine, config }),
        }
    }

    pub fn without_engine() -> Self {
        Self { extractor: LeadExtractor::default(), bound: None }
    }

    pub fn extractor(&self) -> &LeadExtractor {
        &self.extractor
    }

    pub fn has_engine(&self) -> bool {
        self.bound.is_some()
    }
}

impl DeterministicReplyOrchestrator {
    pub fn deterministic(config: Arc<EngineConfig>) -> Self {
        Self::new(LeadEngine::default(), config)
    }
}

impl<R, P> ReplyOrchestrator<R, P>
where
    R: LeadRulesEngine,
    P: QuotePricingEngine,
{
    pub fn decide(&self, text: &str) -> ReplyAction {
        self.report(text).reply
    }

    pub fn report(&self, text: &str) -> DecisionReport {
        let extracted = self.extractor.extract_detailed(text);
        let lead = extracted.lead;

        let Some(bound) = &self.bound else {
            return pass(lead, extracted.budget_source, None, PassReason::EngineUnavailable);
        };
        if !lead.has_service() {
            return pass(lead, extracted.budget_source, None, PassReason::MissingService);
        }
        if !lead.has_quantity() {
            return pass(lead, extracted.budget_source, None, PassReason::MissingQuantity);
        }

        let assessment = bound.engine.assess(&bound.config, &lead);
        let outcome = match (&assessment.decision, &assessment.quote) {
            (LeadDecision::Declined(declined), _) => {
                info!(
                    event_name = "lead.decision.declined",
                    rule_id = declined.rule_id.id(),
                    service = %lead.service,
                    budget = %lead.budget,
                    access = %lead.access,
                    "lead declined automatically"
                );
                Ok(ReplyAction::Decline { message: declined.message.clone() })
            }
            (LeadDecision::Allowed, Some(QuoteOutcome::Priced(range))) => {
                info!(
                    event_name = "lead.decision.range",
                    service = %range.service,
                    qty = %range.qty,
                    low = %range.low,
                    high = %range.high,
                    "price range offered"
                );
                Ok(ReplyAction::Range { message: range_message(range) })
            }
            (LeadDecision::Allowed, Some(QuoteOutcome::Unavailable { reason })) => {
                Err(PassReason::from(*reason))
            }
            (LeadDecision::Allowed, None) => Err(PassReason::EngineUnavailable),
        };

        let reply = match outcome {
            Ok(reply) => reply,
            Err(reason) => return pass(lead, extracted.budget_source, Some(assessment), reason),
        };

        DecisionReport {
            lead,
            budget_source: extracted.budget_source,
            assessment: Some(assessment),
            pass_reason: None,
            reply,
        }
    }
}

/// Customer-facing wording for a priced range.
pub fn range_message(range: &PriceRange) -> String {
    format!(
        "Typical price range: ${}\u{2013}${}. Final price confirmed once we see photos/site conditions.",
        range.low.normalize(),
        range.high.normalize()
    )
}

fn pass(
    lead: Lead,
    budget_source: BudgetSource,
    assessment: Option<LeadAssessment>,
    reason: PassReason,
) -> DecisionReport {
    info!(
        event_name = "lead.decision.pass",
        reason = reason.as_str(),
        service = %lead.service,
        qty = %lead.qty,
        "lead handed to a person"
    );
    DecisionReport {
        lead,
        budget_source,
        assessment,
        pass_reason: Some(reason),
        reply: ReplyAction::Pass,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use siteboss_core::engine::pricing::{PricingFactors, QuotePricingEngine};
    use siteboss_core::engine::rules::DeterministicRulesEngine;
    use siteboss_core::{
        EngineConfig, HeightTag, Lead, LeadEngine, PriceRange, QuoteOutcome, QuoteUnavailable,
        ServiceId,
    };

    use super::{
        range_message, DeterministicReplyOrchestrator, PassReason, ReplyAction, ReplyOrchestrator,
    };

    fn config() -> Arc<EngineConfig> {
        Arc::new(EngineConfig::builtin().expect("bundled config"))
    }

    struct NoRates;

    impl QuotePricingEngine for NoRates {
        fn quote(&self, _config: &EngineConfig, _lead: &Lead) -> QuoteOutcome {
            QuoteOutcome::Unavailable { reason: QuoteUnavailable::MissingBaseRate }
        }
    }

    #[test]
    fn range_message_uses_rounded_bounds() {
        let range = PriceRange {
            service: ServiceId::new("colorbond_fencing"),
            qty: dec!(20),
            factors: PricingFactors {
                height_key: HeightTag::default(),
                height_factor: dec!(1),
                access_key: Default::default(),
                access_factor: dec!(1),
                ground_key: Default::default(),
                ground_factor: dec!(1),
                season_factor: dec!(1),
            },
            raw: dec!(1600),
            low: dec!(1440),
            high: dec!(1920),
            trace: Vec::new(),
        };

        assert_eq!(
            range_message(&range),
            "Typical price range: $1440\u{2013}$1920. Final price confirmed once we see photos/site conditions."
        );
    }

    #[test]
    fn missing_engine_always_passes() {
        let orchestrator = DeterministicReplyOrchestrator::without_engine();
        assert!(!orchestrator.has_engine());

        let report = orchestrator.report("colorbond fence 20m, budget $5000");
        assert_eq!(report.reply, ReplyAction::Pass);
        assert_eq!(report.pass_reason, Some(PassReason::EngineUnavailable));
        assert!(report.assessment.is_none());
    }

    #[test]
    fn missing_quantity_passes_without_assessing() {
        let orchestrator = DeterministicReplyOrchestrator::deterministic(config());
        let report = orchestrator.report("colorbond fence, budget $5000");

        assert_eq!(report.reply, ReplyAction::Pass);
        assert_eq!(report.pass_reason, Some(PassReason::MissingQuantity));
        assert!(report.assessment.is_none());
    }

    #[test]
    fn quote_failure_after_allow_passes() {
        let orchestrator = ReplyOrchestrator::new(
            LeadEngine::new(DeterministicRulesEngine, NoRates),
            config(),
        );
        let report = orchestrator.report("colorbond fence 20m, budget $5000");

        assert_eq!(report.reply, ReplyAction::Pass);
        assert_eq!(report.pass_reason, Some(PassReason::MissingBaseRate));
        assert!(report.assessment.is_some());
    }

    #[test]
    fn extractor_uses_configured_minimum() {
        let orchestrator = DeterministicReplyOrchestrator::deterministic(config());
        assert_eq!(orchestrator.extractor().fallback_budget(), dec!(1500));
    }

    #[test]
    fn reply_actions_serialize_with_action_tag() {
        let decline = ReplyAction::Decline { message: "no thanks".to_string() };
        assert_eq!(
            serde_json::to_value(&decline).expect("serialize"),
            serde_json::json!({ "action": "decline", "message": "no thanks" })
        );
        assert_eq!(
            serde_json::to_value(&ReplyAction::Pass).expect("serialize"),
            serde_json::json!({ "action": "pass" })
        );
        assert_eq!(decline.message(), Some("no thanks"));
        assert_eq!(ReplyAction::Pass.as_str(), "pass");
    }
}
