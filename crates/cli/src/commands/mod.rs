pub mod billing;
pub mod config;
pub mod decide;
pub mod doctor;
pub mod extract;
pub mod quote;

use std::sync::Arc;

use serde::Serialize;
use siteboss_core::config::{AppConfig, LoadOptions};
use siteboss_core::{ApplicationError, EngineConfig};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl CommandResult {
    pub fn success<T: Serialize>(
        command: &str,
        correlation_id: &str,
        message: impl Into<String>,
        data: T,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            correlation_id: Some(correlation_id.to_string()),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            correlation_id: None,
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

/// Operator config plus the engine document it points at, loaded once per command.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub app_config: AppConfig,
    pub engine_config: Arc<EngineConfig>,
    pub correlation_id: String,
}

impl Runtime {
    pub fn load(options: &LoadOptions) -> Result<Self, ApplicationError> {
        let app_config = AppConfig::load(options.clone())?;
        let engine_config = Arc::new(app_config.load_engine_config()?);
        let correlation_id = Uuid::new_v4().to_string();

        info!(
            event_name = "cli.runtime.loaded",
            correlation_id = %correlation_id,
            engine_version = %engine_config.version,
            engine_source = engine_source(&app_config).as_str(),
            "runtime loaded"
        );

        Ok(Self { app_config, engine_config, correlation_id })
    }
}

pub(crate) fn engine_source(config: &AppConfig) -> String {
    config
        .engine
        .config_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "bundled".to_string())
}

fn serialize_payload<T: Serialize>(payload: CommandOutcome<T>) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
