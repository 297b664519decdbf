//! Message handling for inbound trade enquiries.
//!
//! - `extraction` reads a free-text message into a [`siteboss_core::Lead`]
//!   using ordered keyword tables and a handful of patterns.
//! - `reply` runs the extractor, consults the lead engine and chooses one of
//!   three reply actions: decline, range, or pass.
//!
//! Nothing here decides prices or rules itself; that stays in `siteboss-core`.

pub mod extraction;
pub mod reply;

pub use extraction::{BudgetSource, ExtractedLead, LeadExtractor};
pub use reply::{
    DecisionReport, DeterministicReplyOrchestrator, PassReason, ReplyAction, ReplyOrchestrator,
};
