use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::{Access, Ground, HeightTag};
use crate::domain::lead::{Lead, ServiceId};
use crate::engine::config::EngineConfig;
use crate::numeric::{mul_saturating, round_to_ten};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

/// Every key and multiplier that went into a price, echoed for auditability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingFactors {
    pub height_key: HeightTag,
    pub height_factor: Decimal,
    pub access_key: Access,
    pub access_factor: Decimal,
    pub ground_key: Ground,
    pub ground_factor: Decimal,
    pub season_factor: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub service: ServiceId,
    pub qty: Decimal,
    pub factors: PricingFactors,
    pub raw: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub trace: Vec<PricingTraceStep>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteUnavailable {
    UnsupportedService,
    MissingBaseRate,
}

impl QuoteUnavailable {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::UnsupportedService => "unsupported_service",
            Self::MissingBaseRate => "missing_base_rate",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteOutcome {
    Priced(PriceRange),
    Unavailable { reason: QuoteUnavailable },
}

impl QuoteOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Priced(_))
    }

    pub fn priced(&self) -> Option<&PriceRange> {
        match self {
            Self::Priced(range) => Some(range),
            Self::Unavailable { .. } => None,
        }
    }
}

pub trait QuotePricingEngine: Send + Sync {
    fn quote(&self, config: &EngineConfig, lead: &Lead) -> QuoteOutcome;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl QuotePricingEngine for DeterministicPricingEngine {
    fn quote(&self, config: &EngineConfig, lead: &Lead) -> QuoteOutcome {
        price_range(config, lead)
    }
}

/// Computes the quoted range for a lead. Unsupported services and missing base
/// rates are expected business outcomes and come back as
/// [`QuoteOutcome::Unavailable`].
pub fn price_range(config: &EngineConfig, lead: &Lead) -> QuoteOutcome {
    let service = ServiceId::new(lead.service.as_str());
    let qty = lead.clamped_qty();
    let height = HeightTag::normalize(lead.height.as_str());

    if !config.is_service_supported(&service) {
        return QuoteOutcome::Unavailable { reason: QuoteUnavailable::UnsupportedService };
    }

    let Some(base_rate) = config.base_rate(&service) else {
        return QuoteOutcome::Unavailable { reason: QuoteUnavailable::MissingBaseRate };
    };

    let factors = PricingFactors {
        height_factor: config.height_factor(&height),
        height_key: height,
        access_key: lead.access,
        access_factor: config.access_factor(lead.access),
        ground_key: lead.ground,
        ground_factor: config.ground_factor(lead.ground),
        season_factor: config.season_factor(lead.wet_season),
    };

    let mut trace = Vec::with_capacity(8);
    let mut running = mul_saturating(qty, base_rate);
    trace.push(PricingTraceStep {
        stage: "base".to_string(),
        detail: format!("{qty} x base rate {base_rate}"),
        amount: running,
    });

    let adjustments = [
        ("height", factors.height_key.as_str().to_string(), factors.height_factor),
        ("access", factors.access_key.as_str().to_string(), factors.access_factor),
        ("ground", factors.ground_key.as_str().to_string(), factors.ground_factor),
        ("season", season_label(lead.wet_season).to_string(), factors.season_factor),
    ];
    for (stage, key, factor) in adjustments {
        running = mul_saturating(running, factor);
        trace.push(PricingTraceStep {
            stage: stage.to_string(),
            detail: format!("x {factor} ({key})"),
            amount: running,
        });
    }

    let range = &config.pricing_engine.range;
    let raw = round_to_ten(running);
    let low = round_to_ten(mul_saturating(running, range.low_factor));
    let high = round_to_ten(mul_saturating(running, range.high_factor));

    trace.push(PricingTraceStep {
        stage: "raw".to_string(),
        detail: "rounded to nearest 10".to_string(),
        amount: raw,
    });
    trace.push(PricingTraceStep {
        stage: "low".to_string(),
        detail: format!("x {} then rounded to nearest 10", range.low_factor),
        amount: low,
    });
    trace.push(PricingTraceStep {
        stage: "high".to_string(),
        detail: format!("x {} then rounded to nearest 10", range.high_factor),
        amount: high,
    });

    QuoteOutcome::Priced(PriceRange { service, qty, factors, raw, low, high, trace })
}

fn season_label(wet_season: bool) -> &'static str {
    if wet_season {
        "wet season"
    } else {
        "dry season"
    }
}
