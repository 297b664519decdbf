//! Versioned business configuration consumed by the rules and pricing engines.
//!
//! The document is JSON, loaded once at startup and shared read-only. Only the
//! supported-services list and the base-rate table are mandatory; every other
//! field falls back to a neutral default.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::category::{Access, Ground, HeightTag};
use crate::domain::lead::ServiceId;
use crate::engine::rules::DeclineRule;

const BUILTIN_ENGINE_CONFIG_JSON: &str = include_str!("../../config/siteboss-core-v1.json");

pub const FALLBACK_RULE_MESSAGE: &str = "Thanks for reaching out.";

#[derive(Debug, Error)]
pub enum EngineConfigError {
    #[error("could not read engine config `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse engine config `{source_name}`: {source}")]
    Parse { source_name: String, source: serde_json::Error },
    #[error("engine config invalid: {0}")]
    Integrity(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub version: String,
    pub business_rules: BusinessRules,
    pub pricing_engine: PricingModel,
    pub lead_filtering: LeadFiltering,
    pub payment_chasing: PaymentChasing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessRules {
    pub supported_services: Vec<ServiceId>,
    pub minimum_job_value: Decimal,
    pub tight_access_minimum: Decimal,
    pub wet_season_multiplier: Decimal,
    pub deposit_percentage_default: Decimal,
    pub block_new_work_if_overdue: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingModel {
    pub base_rates: BTreeMap<ServiceId, Decimal>,
    pub multipliers: Multipliers,
    pub range: RangeFactors,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    pub height: BTreeMap<String, Decimal>,
    pub access: BTreeMap<String, Decimal>,
    pub ground: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFactors {
    pub low_factor: Decimal,
    pub high_factor: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFiltering {
    pub rules: Vec<RuleMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMessage {
    pub id: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentChasing {
    pub schedule: Vec<ChaseStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseStep {
    pub day: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "unversioned".to_string(),
            business_rules: BusinessRules::default(),
            pricing_engine: PricingModel::default(),
            lead_filtering: LeadFiltering::default(),
            payment_chasing: PaymentChasing::default(),
        }
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            supported_services: Vec::new(),
            minimum_job_value: Decimal::from(1500),
            tight_access_minimum: Decimal::ZERO,
            wet_season_multiplier: Decimal::ONE,
            deposit_percentage_default: Decimal::ZERO,
            block_new_work_if_overdue: false,
        }
    }
}

impl Default for RangeFactors {
    fn default() -> Self {
        Self { low_factor: Decimal::ONE, high_factor: Decimal::ONE }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, EngineConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| EngineConfigError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw, &path.display().to_string())
    }

    /// The configuration bundled with the crate, used when no path is configured.
    pub fn builtin() -> Result<Self, EngineConfigError> {
        Self::from_json_str(BUILTIN_ENGINE_CONFIG_JSON, "builtin:siteboss-core-v1.json")
    }

    pub fn from_json_str(raw: &str, source_name: &str) -> Result<Self, EngineConfigError> {
        let config = serde_json::from_str::<Self>(raw).map_err(|source| {
            EngineConfigError::Parse { source_name: source_name.to_string(), source }
        })?;
        config.validate()?;

        info!(
            event_name = "engine_config.loaded",
            source = source_name,
            version = %config.version,
            supported_services = config.business_rules.supported_services.len(),
            "engine configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineConfigError> {
        validate_business_rules(&self.business_rules)?;
        validate_pricing_model(&self.pricing_engine)?;
        validate_lead_filtering(&self.lead_filtering)?;
        Ok(())
    }

    pub fn is_service_supported(&self, service: &ServiceId) -> bool {
        self.business_rules.supported_services.iter().any(|supported| supported == service)
    }

    pub fn base_rate(&self, service: &ServiceId) -> Option<Decimal> {
        self.pricing_engine.base_rates.get(service).copied()
    }

    pub fn rule_message(&self, rule: DeclineRule) -> &str {
        self.lead_filtering
            .rules
            .iter()
            .find(|candidate| candidate.id == rule.id())
            .map(|candidate| candidate.message.as_str())
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(FALLBACK_RULE_MESSAGE)
    }

    pub fn height_factor(&self, height: &HeightTag) -> Decimal {
        factor_or_one(&self.pricing_engine.multipliers.height, height.as_str())
    }

    pub fn access_factor(&self, access: Access) -> Decimal {
        factor_or_one(&self.pricing_engine.multipliers.access, access.as_str())
    }

    pub fn ground_factor(&self, ground: Ground) -> Decimal {
        factor_or_one(&self.pricing_engine.multipliers.ground, ground.as_str())
    }

    pub fn season_factor(&self, wet_season: bool) -> Decimal {
        if wet_season {
            self.business_rules.wet_season_multiplier
        } else {
            Decimal::ONE
        }
    }
}

fn factor_or_one(table: &BTreeMap<String, Decimal>, key: &str) -> Decimal {
    table.get(key).copied().unwrap_or(Decimal::ONE)
}

fn validate_business_rules(rules: &BusinessRules) -> Result<(), EngineConfigError> {
    if rules.supported_services.is_empty() {
        return Err(EngineConfigError::Integrity(
            "business_rules.supported_services must list at least one service".to_string(),
        ));
    }

    if rules.supported_services.iter().any(ServiceId::is_unknown) {
        return Err(EngineConfigError::Integrity(
            "business_rules.supported_services must not contain blank service ids".to_string(),
        ));
    }

    if rules.minimum_job_value < Decimal::ZERO || rules.tight_access_minimum < Decimal::ZERO {
        return Err(EngineConfigError::Integrity(
            "business_rules.minimum_job_value and tight_access_minimum must be >= 0".to_string(),
        ));
    }

    if rules.wet_season_multiplier <= Decimal::ZERO {
        return Err(EngineConfigError::Integrity(
            "business_rules.wet_season_multiplier must be greater than zero".to_string(),
        ));
    }

    if rules.deposit_percentage_default < Decimal::ZERO
        || rules.deposit_percentage_default > Decimal::ONE
    {
        return Err(EngineConfigError::Integrity(
            "business_rules.deposit_percentage_default must be a fraction in 0..=1".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing_model(model: &PricingModel) -> Result<(), EngineConfigError> {
    if model.base_rates.is_empty() {
        return Err(EngineConfigError::Integrity(
            "pricing_engine.base_rates must define at least one service rate".to_string(),
        ));
    }

    if let Some((service, _)) = model.base_rates.iter().find(|(_, rate)| **rate < Decimal::ZERO)
    {
        return Err(EngineConfigError::Integrity(format!(
            "pricing_engine.base_rates.{service} must be >= 0"
        )));
    }

    let tables = [
        ("height", &model.multipliers.height),
        ("access", &model.multipliers.access),
        ("ground", &model.multipliers.ground),
    ];
    for (name, table) in tables {
        if let Some((key, _)) = table.iter().find(|(_, factor)| **factor <= Decimal::ZERO) {
            return Err(EngineConfigError::Integrity(format!(
                "pricing_engine.multipliers.{name}.{key} must be greater than zero"
            )));
        }
    }

    if model.range.low_factor <= Decimal::ZERO || model.range.high_factor <= Decimal::ZERO {
        return Err(EngineConfigError::Integrity(
            "pricing_engine.range factors must be greater than zero".to_string(),
        ));
    }

    if model.range.low_factor > model.range.high_factor {
        return Err(EngineConfigError::Integrity(
            "pricing_engine.range.low_factor must not exceed high_factor".to_string(),
        ));
    }

    Ok(())
}

fn validate_lead_filtering(filtering: &LeadFiltering) -> Result<(), EngineConfigError> {
    let mut seen = BTreeSet::new();
    for rule in &filtering.rules {
        if !seen.insert(rule.id.as_str()) {
            return Err(EngineConfigError::Integrity(format!(
                "lead_filtering.rules contains duplicate rule id `{}`",
                rule.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use super::{EngineConfig, EngineConfigError, FALLBACK_RULE_MESSAGE};
    use crate::domain::category::{Access, Ground, HeightTag};
    use crate::domain::lead::ServiceId;
    use crate::engine::rules::DeclineRule;

    const MINIMAL: &str = r#"{
        "business_rules": { "supported_services": ["colorbond_fencing"] },
        "pricing_engine": { "base_rates": { "colorbond_fencing": 80 } }
    }"#;

    #[test]
    fn builtin_config_loads_and_passes_integrity_checks() {
        let config = EngineConfig::builtin().expect("bundled config should be valid");
        assert!(!config.business_rules.supported_services.is_empty());
        assert!(!config.pricing_engine.base_rates.is_empty());
        assert_ne!(config.version, "unversioned");
    }

    #[test]
    fn minimal_document_fills_optional_fields_with_defaults() {
        let config = EngineConfig::from_json_str(MINIMAL, "test").expect("minimal config");
        assert_eq!(config.version, "unversioned");
        assert_eq!(config.business_rules.minimum_job_value, dec!(1500));
        assert_eq!(config.business_rules.tight_access_minimum, Decimal::ZERO);
        assert_eq!(config.season_factor(true), Decimal::ONE);
        assert_eq!(config.pricing_engine.range.low_factor, Decimal::ONE);
        assert!(config.payment_chasing.schedule.is_empty());
        assert!(!config.business_rules.block_new_work_if_overdue);
    }

    #[test]
    fn missing_supported_services_fails_fast() {
        let raw = r#"{ "pricing_engine": { "base_rates": { "excavation": 95 } } }"#;
        let error = EngineConfig::from_json_str(raw, "test").expect_err("should fail");
        assert!(matches!(
            error,
            EngineConfigError::Integrity(ref message) if message.contains("supported_services")
        ));
    }

    #[test]
    fn missing_base_rates_fails_fast() {
        let raw = r#"{ "business_rules": { "supported_services": ["excavation"] } }"#;
        let error = EngineConfig::from_json_str(raw, "test").expect_err("should fail");
        assert!(matches!(
            error,
            EngineConfigError::Integrity(ref message) if message.contains("base_rates")
        ));
    }

    #[test]
    fn inverted_range_and_duplicate_rules_are_rejected() {
        let inverted = r#"{
            "business_rules": { "supported_services": ["excavation"] },
            "pricing_engine": {
                "base_rates": { "excavation": 95 },
                "range": { "low_factor": 1.3, "high_factor": 0.9 }
            }
        }"#;
        assert!(EngineConfig::from_json_str(inverted, "test").is_err());

        let duplicated = r#"{
            "business_rules": { "supported_services": ["excavation"] },
            "pricing_engine": { "base_rates": { "excavation": 95 } },
            "lead_filtering": { "rules": [
                { "id": "min_job_value", "message": "a" },
                { "id": "min_job_value", "message": "b" }
            ] }
        }"#;
        assert!(EngineConfig::from_json_str(duplicated, "test").is_err());
    }

    #[test]
    fn malformed_json_reports_the_source_name() {
        let error = EngineConfig::from_json_str("{ not json", "broken.json").expect_err("fail");
        assert!(error.to_string().contains("broken.json"));
    }

    #[test]
    fn load_reads_document_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("core.json");
        fs::write(&path, MINIMAL).expect("write config");

        let config = EngineConfig::load(&path).expect("load from disk");
        assert!(config.is_service_supported(&ServiceId::new("colorbond_fencing")));

        let missing = EngineConfig::load(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(EngineConfigError::ReadFile { .. })));
    }

    #[test]
    fn unknown_multiplier_keys_and_rule_ids_use_fallbacks() {
        let config = EngineConfig::from_json_str(MINIMAL, "test").expect("minimal config");
        assert_eq!(config.height_factor(&HeightTag::normalize("2.1m")), Decimal::ONE);
        assert_eq!(config.access_factor(Access::Tight), Decimal::ONE);
        assert_eq!(config.ground_factor(Ground::Rocky), Decimal::ONE);
        assert_eq!(config.rule_message(DeclineRule::MinJobValue), FALLBACK_RULE_MESSAGE);
        assert_eq!(config.base_rate(&ServiceId::new("excavation")), None);
    }
}
