use std::sync::Arc;

use anyhow::{ensure, Context};
use serde::Serialize;
use siteboss_agent::{DeterministicReplyOrchestrator, ReplyAction};
use siteboss_core::config::{AppConfig, LoadOptions};
use siteboss_core::{ApplicationError, EngineConfig};

use crate::commands::{engine_source, CommandResult};

const SAMPLE_MESSAGE: &str = "Need colorbond fencing, 20m, 1.8m height, easy access";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
    #[serde(skip)]
    exit_code: u8,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = report.exit_code;

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();
    let mut exit_code = 0;

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            match config.load_engine_config() {
                Ok(engine) => {
                    checks.push(DoctorCheck {
                        name: "engine_config_integrity",
                        status: CheckStatus::Pass,
                        details: format!(
                            "engine config `{}` ({}) passed integrity checks",
                            engine.version,
                            engine_source(&config)
                        ),
                    });
                    let smoke = check_sample_decision(Arc::new(engine));
                    if smoke.status == CheckStatus::Fail {
                        exit_code = 1;
                    }
                    checks.push(smoke);
                }
                Err(error) => {
                    let error = ApplicationError::from(error);
                    exit_code = error.exit_code();
                    checks.push(DoctorCheck {
                        name: "engine_config_integrity",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("sample_decision", "engine configuration did not load"));
                }
            }
        }
        Err(error) => {
            let error = ApplicationError::from(error);
            exit_code = error.exit_code();
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("engine_config_integrity", "configuration did not load"));
            checks.push(skipped("sample_decision", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks, exit_code }
}

fn check_sample_decision(engine: Arc<EngineConfig>) -> DoctorCheck {
    match run_sample_decision(engine) {
        Ok(details) => DoctorCheck { name: "sample_decision", status: CheckStatus::Pass, details },
        Err(error) => DoctorCheck {
            name: "sample_decision",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

// Any reply is acceptable as long as the engine was consulted.
fn run_sample_decision(engine: Arc<EngineConfig>) -> anyhow::Result<String> {
    let orchestrator = DeterministicReplyOrchestrator::deterministic(engine);
    let report = orchestrator.report(SAMPLE_MESSAGE);

    let assessment = report
        .assessment
        .as_ref()
        .context("sample message was not assessed by the engine")?;
    if let ReplyAction::Range { message } = &report.reply {
        ensure!(!message.is_empty(), "range reply has an empty message");
        let quote = assessment.quote.as_ref().context("range reply without a quote")?;
        let range = quote.priced().context("range reply without a priced quote")?;
        ensure!(range.low <= range.high, "price range is inverted: {} > {}", range.low, range.high);
    }

    Ok(format!("sample message answered with `{}`", report.reply.as_str()))
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
