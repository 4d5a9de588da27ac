//! Randomized, constraint-satisfying charity selection.
//!
//! Candidates are split into a national pool and a pool for the user's
//! region, the output slots are divided between them at random, tailoring
//! rules reserve category minimums, and the rest is filled by uniform
//! sampling without replacement.

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{LocalStorage, RuleSpec, SelectionConstraints};
pub use crate::core::{
    engine::SelectionEngine,
    runner::SelectionRunner,
    source::CsvRecordSource,
    tailoring::{AttributeRule, PetOwnerRule, TailoringRule},
};
pub use crate::domain::model::{
    AttributeValue, CandidateItem, RuleOutcome, Scope, SelectionResult, SelectionSummary,
    UserProfile,
};
pub use crate::utils::error::{Result, SelectError};
