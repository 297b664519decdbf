use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::config::EngineConfigError;

/// Failures that stop the process before any lead is evaluated.
///
/// Unsupported services and missing base rates are not errors; they come back
/// from the engine as structured outcomes.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    EngineConfig(#[from] EngineConfigError),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_validation",
            Self::EngineConfig(_) => "engine_config",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::EngineConfig(_) => 3,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => {
                "Operator configuration is invalid. Check siteboss.toml and SITEBOSS_* variables."
            }
            Self::EngineConfig(_) => {
                "Engine configuration failed integrity checks. Fix the pricing document and retry."
            }
        }
    }
}
