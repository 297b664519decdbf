//! Rules, pricing, and configuration for qualifying inbound trade-job leads.
//!
//! Everything in this crate is a pure function over an immutable
//! [`EngineConfig`]; the configuration can be shared across threads and
//! evaluated concurrently without coordination.

pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod numeric;

pub use domain::account::{AccountStanding, JobBooking, VariationRequest};
pub use domain::category::{Access, Ground, HeightTag};
pub use domain::lead::{Lead, LeadInput, ServiceId};
pub use engine::config::{EngineConfig, EngineConfigError};
pub use engine::pricing::{PriceRange, PricingFactors, QuoteOutcome, QuoteUnavailable};
pub use engine::rules::{DeclineRule, DeclinedLead, LeadDecision};
pub use engine::{DeterministicLeadEngine, LeadAssessment, LeadEngine};
pub use errors::ApplicationError;
