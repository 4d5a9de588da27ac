use crate::config::constraints::SelectionConstraints;
use crate::domain::model::{CandidateItem, UserProfile};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn constraints(&self) -> SelectionConstraints;
}

/// Supplies already validated inputs for one selection.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load_candidates(&self) -> Result<Vec<CandidateItem>>;
    async fn load_profile(&self) -> Result<UserProfile>;
}
