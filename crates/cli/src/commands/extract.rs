use siteboss_agent::LeadExtractor;
use siteboss_core::config::LoadOptions;

use crate::commands::{CommandResult, Runtime};

const COMMAND: &str = "extract";

pub fn run(options: &LoadOptions, text: &str) -> CommandResult {
    let runtime = match Runtime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let extracted = LeadExtractor::for_config(&runtime.engine_config).extract_detailed(text);
    let message = if extracted.lead.has_service() {
        format!("detected service `{}`", extracted.lead.service)
    } else {
        "no service detected".to_string()
    };

    CommandResult::success(COMMAND, &runtime.correlation_id, message, extracted)
}
