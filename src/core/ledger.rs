use crate::core::partition::Pool;
use crate::domain::model::CandidateItem;
use crate::utils::error::{Result, SelectError};
use std::collections::HashSet;

/// Running record of every item drawn during one selection.
///
/// Ids are checked on every insert, so a duplicate is caught at the draw that
/// produced it rather than at the end.
#[derive(Debug, Default)]
pub struct DrawLedger<'a> {
    entries: Vec<(Pool, &'a CandidateItem)>,
    ids: HashSet<&'a str>,
}

impl<'a> DrawLedger<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pool: Pool, item: &'a CandidateItem) -> Result<()> {
        if !self.ids.insert(item.id.as_str()) {
            return Err(SelectError::invariant(format!(
                "candidate '{}' drawn twice",
                item.id
            )));
        }
        self.entries.push((pool, item));
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, pool: Pool) -> usize {
        self.entries.iter().filter(|(p, _)| *p == pool).count()
    }

    pub fn entries(&self) -> &[(Pool, &'a CandidateItem)] {
        &self.entries
    }
}
