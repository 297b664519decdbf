use siteboss_agent::DeterministicReplyOrchestrator;
use siteboss_core::config::LoadOptions;
use tracing::info_span;

use crate::commands::{CommandResult, Runtime};

const COMMAND: &str = "decide";

pub fn run(options: &LoadOptions, text: &str, full_report: bool) -> CommandResult {
    let runtime = match Runtime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let span = info_span!("lead_decision", correlation_id = %runtime.correlation_id);
    let _entered = span.enter();

    let orchestrator = DeterministicReplyOrchestrator::deterministic(runtime.engine_config.clone());
    let report = orchestrator.report(text);
    let message = format!("reply action: {}", report.reply.as_str());

    if full_report {
        CommandResult::success(COMMAND, &runtime.correlation_id, message, report)
    } else {
        CommandResult::success(COMMAND, &runtime.correlation_id, message, report.reply)
    }
}
