use crate::core::engine::SelectionEngine;
use crate::core::RecordSource;
use crate::domain::model::SelectionResult;
use crate::utils::error::Result;

/// Loads inputs from a [`RecordSource`] once, then runs the engine.
pub struct SelectionRunner<S: RecordSource> {
    source: S,
    engine: SelectionEngine,
}

impl<S: RecordSource> SelectionRunner<S> {
    pub fn new(source: S, engine: SelectionEngine) -> Self {
        Self { source, engine }
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub async fn run(&self) -> Result<SelectionResult> {
        tracing::debug!("Loading candidates and profile");
        let (candidates, profile) =
            tokio::try_join!(self.source.load_candidates(), self.source.load_profile())?;

        self.engine.select(&candidates, &profile)
    }
}
