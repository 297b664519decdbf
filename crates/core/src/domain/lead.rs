use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::{Access, Ground, HeightTag};
use crate::numeric::{clamp_decimal, clamp_float, BUDGET_MAX, QTY_MAX};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(pub String);

impl ServiceId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One candidate job, derived from a single inbound message.
///
/// Every field has a default so a lead is well-formed even when nothing was
/// recognised: unknown service is empty, amounts are zero, categories fall
/// back to `easy` / `unknown` / `1.8m`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub service: ServiceId,
    pub budget: Decimal,
    pub qty: Decimal,
    pub height: HeightTag,
    pub access: Access,
    pub ground: Ground,
    pub wet_season: bool,
}

impl Lead {
    pub fn has_service(&self) -> bool {
        !self.service.is_unknown()
    }

    pub fn has_quantity(&self) -> bool {
        self.qty > Decimal::ZERO
    }

    pub fn clamped_budget(&self) -> Decimal {
        clamp_decimal(self.budget, Decimal::ZERO, BUDGET_MAX)
    }

    pub fn clamped_qty(&self) -> Decimal {
        clamp_decimal(self.qty, Decimal::ZERO, QTY_MAX)
    }
}

/// Unnormalized lead fields as a caller or a JSON payload supplies them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadInput {
    pub service: Option<String>,
    pub budget: Option<f64>,
    pub qty: Option<f64>,
    pub height: Option<String>,
    pub access: Option<String>,
    pub ground: Option<String>,
    pub wet_season: bool,
}

impl LeadInput {
    pub fn normalize(&self) -> Lead {
        Lead {
            service: ServiceId::new(self.service.as_deref().unwrap_or_default()),
            budget: clamp_float(self.budget.unwrap_or(f64::NAN), Decimal::ZERO, BUDGET_MAX),
            qty: clamp_float(self.qty.unwrap_or(f64::NAN), Decimal::ZERO, QTY_MAX),
            height: self.height.as_deref().map(HeightTag::normalize).unwrap_or_default(),
            access: Access::normalize(self.access.as_deref().unwrap_or_default()),
            ground: Ground::normalize(self.ground.as_deref().unwrap_or_default()),
            wet_season: self.wet_season,
        }
    }
}

impl From<LeadInput> for Lead {
    fn from(input: LeadInput) -> Self {
        input.normalize()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{Lead, LeadInput, ServiceId};
    use crate::domain::category::{Access, Ground};

    #[test]
    fn default_lead_is_well_formed_with_documented_fallbacks() {
        let lead = Lead::default();
        assert!(!lead.has_service());
        assert!(!lead.has_quantity());
        assert_eq!(lead.budget, Decimal::ZERO);
        assert_eq!(lead.height.as_str(), "1.8m");
        assert_eq!(lead.access, Access::Easy);
        assert_eq!(lead.ground, Ground::Unknown);
        assert!(!lead.wet_season);
    }

    #[test]
    fn raw_input_is_trimmed_clamped_and_categorised() {
        let lead = LeadInput {
            service: Some("  timber_fencing ".to_string()),
            budget: Some(5e12),
            qty: Some(-3.0),
            height: Some("1500".to_string()),
            access: Some("Limited".to_string()),
            ground: Some("rock".to_string()),
            wet_season: true,
        }
        .normalize();

        assert_eq!(lead.service, ServiceId("timber_fencing".to_string()));
        assert_eq!(lead.budget, dec!(1000000000));
        assert_eq!(lead.qty, Decimal::ZERO);
        assert_eq!(lead.height.as_str(), "1.5m");
        assert_eq!(lead.access, Access::Restricted);
        assert_eq!(lead.ground, Ground::Rocky);
        assert!(lead.wet_season);
    }

    #[test]
    fn empty_input_normalizes_to_the_default_lead() {
        assert_eq!(LeadInput::default().normalize(), Lead::default());
    }

    #[test]
    fn lead_input_deserializes_from_partial_json() {
        let input: LeadInput =
            serde_json::from_str(r#"{"service":"excavation","qty":12.5,"budget":null}"#)
                .expect("partial lead json should parse");
        let lead = Lead::from(input);
        assert_eq!(lead.service.as_str(), "excavation");
        assert_eq!(lead.qty, dec!(12.5));
        assert_eq!(lead.budget, Decimal::ZERO);
    }
}
