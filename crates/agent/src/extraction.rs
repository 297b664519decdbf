//! Keyword and pattern based lead extraction.
//!
//! Matching is deterministic and case-insensitive. Nothing here fails: a
//! message with no recognisable content still yields a well-formed [`Lead`]
//! built from the documented fallbacks.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteboss_core::numeric::{clamp_decimal, parse_amount, round_whole, BUDGET_MAX, QTY_MAX};
use siteboss_core::{Access, EngineConfig, Ground, HeightTag, Lead, ServiceId};

/// Budget used when no figure is mentioned and no configuration is available.
pub const FALLBACK_MINIMUM_JOB_VALUE: Decimal = Decimal::from_parts(1500, 0, 0, false, 0);

/// Checked top to bottom; the first group with a matching keyword wins, even
/// when a later group would also match. Generic fence mentions land on
/// colorbond because that check runs last.
const SERVICE_KEYWORDS: &[(&[&str], &str)] = &[
    (&["pressure", "wash"], "pressure_washing"),
    (&["retaining", "sleeper"], "retaining_walls"),
    (&["excav", "digger", "bobcat"], "excavation"),
    (&["landscap", "turf", "garden"], "landscaping"),
    (&["colorbond", "colourbond"], "colorbond_fencing"),
    (&["aluminium", "aluminum", "pool fence"], "aluminium_fencing"),
    (&["timber", "paling", "pailing"], "timber_fencing"),
    (&["fence", "fencing"], "colorbond_fencing"),
];

const ACCESS_KEYWORDS: &[(&[&str], Access)] = &[
    (&["tight access", "no access", "behind shed", "narrow"], Access::Tight),
    (&["restricted", "limited", "stairs", "steep"], Access::Restricted),
];

static METRES_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*(?:m|metre|metres)(?-u:\b)")
        .expect("metres pattern is valid")
});

static HEIGHT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)(1\.2|1\.5|1\.8|2\.1)\s*m(?-u:\b)").expect("height pattern is valid")
});

static CURRENCY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s*([0-9]+(?:,[0-9]{3})*)(?:\.[0-9]{2})?")
        .expect("currency pattern is valid")
});

static BUDGET_SUFFIX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)budget(?-u:\b)[^0-9]{0,10}([0-9]+(?:\.[0-9]+)?)\s*(k|grand)(?-u:\b)")
        .expect("budget suffix pattern is valid")
});

/// Where an extracted budget came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSource {
    /// A `$` amount in the message.
    Currency,
    /// `budget ... 5k` / `budget ... 3 grand`.
    Shorthand,
    /// No figure and no budget wording, so the minimum job value was assumed.
    AssumedMinimum,
    /// Budget wording or a `$` was present but no amount could be read.
    Unreadable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLead {
    pub lead: Lead,
    pub budget_source: BudgetSource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeadExtractor {
    fallback_budget: Decimal,
}

impl Default for LeadExtractor {
    fn default() -> Self {
        Self { fallback_budget: FALLBACK_MINIMUM_JOB_VALUE }
    }
}

impl LeadExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the configured minimum job value as the assumed budget.
    pub fn for_config(config: &EngineConfig) -> Self {
        Self { fallback_budget: config.business_rules.minimum_job_value }
    }

    pub fn fallback_budget(&self) -> Decimal {
        self.fallback_budget
    }

    pub fn extract(&self, text: &str) -> Lead {
        self.extract_detailed(text).lead
    }

    pub fn extract_detailed(&self, text: &str) -> ExtractedLead {
        let normalized_text = normalize_text(text);
        let (budget, budget_source) = self.extract_budget(text, &normalized_text);

        let lead = Lead {
            service: detect_service(&normalized_text),
            budget,
            qty: extract_metres(&normalized_text),
            height: extract_height(&normalized_text),
            access: extract_access(&normalized_text),
            ground: Ground::Unknown,
            wet_season: false,
        };

        ExtractedLead { lead, budget_source }
    }

    fn extract_budget(&self, raw_text: &str, normalized_text: &str) -> (Decimal, BudgetSource) {
        let has_dollar = raw_text.contains('$');
        let has_budget_word = normalized_text.contains("budget");
        let mut budget = Decimal::ZERO;
        let mut source = BudgetSource::Unreadable;

        if has_dollar {
            if let Some(amount) = currency_amount(raw_text) {
                budget = amount;
                source = BudgetSource::Currency;
            }
        }

        let has_shorthand_hint = normalized_text.contains('k') || normalized_text.contains("grand");
        if budget <= Decimal::ZERO && (has_budget_word || has_shorthand_hint) {
            if let Some(amount) = shorthand_amount(normalized_text) {
                budget = amount;
                source = BudgetSource::Shorthand;
            }
        }

        if !has_dollar && !has_budget_word && budget <= Decimal::ZERO {
            return (self.fallback_budget, BudgetSource::AssumedMinimum);
        }

        (clamp_decimal(budget, Decimal::ZERO, BUDGET_MAX), source)
    }
}

pub fn detect_service(normalized_text: &str) -> ServiceId {
    SERVICE_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| normalized_text.contains(keyword)))
        .map(|(_, service)| ServiceId::new(service))
        .unwrap_or_default()
}

pub fn extract_metres(normalized_text: &str) -> Decimal {
    METRES_PATTERN
        .captures(normalized_text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| parse_amount(value.as_str(), QTY_MAX))
        .map(|qty| clamp_decimal(qty, Decimal::ZERO, QTY_MAX))
        .unwrap_or(Decimal::ZERO)
}

pub fn extract_height(normalized_text: &str) -> HeightTag {
    HEIGHT_PATTERN
        .captures(normalized_text)
        .and_then(|captures| captures.get(1))
        .map(|value| HeightTag(format!("{}m", value.as_str())))
        .unwrap_or_default()
}

pub fn extract_access(normalized_text: &str) -> Access {
    ACCESS_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| normalized_text.contains(keyword)))
        .map(|(_, access)| *access)
        .unwrap_or_default()
}

fn currency_amount(raw_text: &str) -> Option<Decimal> {
    let captures = CURRENCY_PATTERN.captures(raw_text)?;
    let digits = captures.get(1)?.as_str().replace(',', "");
    parse_amount(&digits, BUDGET_MAX)
}

fn shorthand_amount(normalized_text: &str) -> Option<Decimal> {
    let captures = BUDGET_SUFFIX_PATTERN.captures(normalized_text)?;
    let amount = parse_amount(captures.get(1)?.as_str(), BUDGET_MAX)?;
    let multiplier = shorthand_multiplier(captures.get(2)?.as_str());
    Some(round_whole(amount.checked_mul(multiplier).unwrap_or(BUDGET_MAX)))
}

// "grand" and "k" both mean thousands.
fn shorthand_multiplier(suffix: &str) -> Decimal {
    match suffix {
        "k" | "grand" => Decimal::ONE_THOUSAND,
        _ => Decimal::ONE,
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}
