use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use siteboss_core::config::{AppConfig, LoadOptions};
use siteboss_core::ApplicationError;
use toml::Value;

use crate::commands::{engine_source, CommandResult};

struct ConfigField<'a> {
    key_path: &'a str,
    env_keys: &'a [&'a str],
    overridden_by: Option<&'a str>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::from(error);
            return CommandResult {
                exit_code: error.exit_code(),
                output: format!("config validation failed: {error}"),
            };
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let overrides = &options.overrides;

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    let fields = [
        (
            ConfigField {
                key_path: "engine.config_path",
                env_keys: &["SITEBOSS_ENGINE_CONFIG_PATH"],
                overridden_by: overrides.engine_config_path.as_ref().map(|_| "--engine-config"),
            },
            config
                .engine
                .config_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<bundled>".to_string()),
        ),
        (
            ConfigField {
                key_path: "logging.level",
                env_keys: &["SITEBOSS_LOGGING_LEVEL", "SITEBOSS_LOG_LEVEL"],
                overridden_by: overrides.log_level.as_ref().map(|_| "--log-level"),
            },
            config.logging.level.clone(),
        ),
        (
            ConfigField {
                key_path: "logging.format",
                env_keys: &["SITEBOSS_LOGGING_FORMAT", "SITEBOSS_LOG_FORMAT"],
                overridden_by: overrides.log_format.as_ref().map(|_| "--log-format"),
            },
            format!("{:?}", config.logging.format).to_lowercase(),
        ),
    ];

    for (field, value) in &fields {
        let source = field_source(field, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(field.key_path, value, source));
    }

    match config.load_engine_config() {
        Ok(engine) => lines.push(format!(
            "- engine.version = {} (source: {})",
            engine.version,
            engine_source(&config)
        )),
        Err(error) => {
            let error = ApplicationError::from(error);
            lines.push(format!("- engine.version = <unavailable> ({error})"));
            return CommandResult { exit_code: error.exit_code(), output: lines.join("\n") };
        }
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("siteboss.toml"), PathBuf::from("config/siteboss.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &ConfigField<'_>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(flag) = field.overridden_by {
        return format!("override ({flag})");
    }

    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, field.key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
