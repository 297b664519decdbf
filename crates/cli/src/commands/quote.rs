use serde::Serialize;
use siteboss_core::config::LoadOptions;
use siteboss_core::{DeterministicLeadEngine, Lead, LeadDecision, LeadInput, QuoteOutcome};
use tracing::info;

use crate::commands::{CommandResult, Runtime};

const COMMAND: &str = "quote";

/// Decision and price are reported side by side; a declined lead still shows
/// what it would have cost.
#[derive(Debug, Serialize)]
struct QuoteView {
    lead: Lead,
    decision: LeadDecision,
    quote: QuoteOutcome,
}

pub fn run(options: &LoadOptions, input: LeadInput) -> CommandResult {
    let runtime = match Runtime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let lead = input.normalize();
    let engine = DeterministicLeadEngine::default();
    let decision = engine.evaluate(&runtime.engine_config, &lead);
    let quote = engine.quote(&runtime.engine_config, &lead);

    let message = match &quote {
        QuoteOutcome::Priced(range) => format!("priced at {} to {}", range.low, range.high),
        QuoteOutcome::Unavailable { reason } => format!("no price: {}", reason.reason_code()),
    };
    info!(
        event_name = "cli.quote.completed",
        correlation_id = %runtime.correlation_id,
        service = %lead.service,
        allowed = decision.is_allowed(),
        priced = quote.is_ok(),
        "quote computed"
    );

    CommandResult::success(
        COMMAND,
        &runtime.correlation_id,
        message,
        QuoteView { lead, decision, quote },
    )
}
