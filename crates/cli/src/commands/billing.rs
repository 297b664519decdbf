use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use siteboss_core::config::LoadOptions;
use siteboss_core::engine::billing::{
    dated_chase_schedule, deposit_amount, payment_chase_schedule, DatedChaseStep,
};
use siteboss_core::engine::config::ChaseStep;

use crate::commands::{CommandResult, Runtime};

#[derive(Debug, Serialize)]
struct DepositView {
    total: Decimal,
    deposit_percentage: Decimal,
    deposit: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ScheduleView {
    Relative { steps: Vec<ChaseStep> },
    Dated { invoice_date: NaiveDate, steps: Vec<DatedChaseStep> },
}

pub fn deposit(options: &LoadOptions, total: Decimal) -> CommandResult {
    const COMMAND: &str = "deposit";

    let runtime = match Runtime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let deposit = deposit_amount(&runtime.engine_config, total);
    let view = DepositView {
        total,
        deposit_percentage: runtime.engine_config.business_rules.deposit_percentage_default,
        deposit,
    };

    let message = format!("deposit due: {deposit}");
    CommandResult::success(COMMAND, &runtime.correlation_id, message, view)
}

pub fn chase_schedule(options: &LoadOptions, invoice_date: Option<NaiveDate>) -> CommandResult {
    const COMMAND: &str = "chase-schedule";

    let runtime = match Runtime::load(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let view = match invoice_date {
        Some(invoice_date) => ScheduleView::Dated {
            invoice_date,
            steps: dated_chase_schedule(&runtime.engine_config, invoice_date),
        },
        None => ScheduleView::Relative { steps: payment_chase_schedule(&runtime.engine_config) },
    };
    let count = match &view {
        ScheduleView::Relative { steps } => steps.len(),
        ScheduleView::Dated { steps, .. } => steps.len(),
    };

    CommandResult::success(
        COMMAND,
        &runtime.correlation_id,
        format!("{count} reminder(s) scheduled"),
        view,
    )
}
