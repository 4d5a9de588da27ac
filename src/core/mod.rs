pub mod assembler;
pub mod capacity;
pub mod engine;
pub mod ledger;
pub mod partition;
pub mod runner;
pub mod sampler;
pub mod source;
pub mod tailoring;

pub use crate::domain::model::{CandidateItem, Scope, SelectionResult, UserProfile};
pub use crate::domain::ports::{ConfigProvider, RecordSource, Storage};
pub use crate::utils::error::Result;
