use crate::domain::model::{CandidateItem, Scope, UserProfile};
use crate::utils::error::{Result, SelectError};
use std::collections::HashSet;
use std::fmt;

/// One of the two eligibility pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    National,
    Regional,
}

impl Pool {
    pub fn other(self) -> Pool {
        match self {
            Pool::National => Pool::Regional,
            Pool::Regional => Pool::National,
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            Pool::National => Scope::National,
            Pool::Regional => Scope::Regional,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::National => write!(f, "national"),
            Pool::Regional => write!(f, "regional"),
        }
    }
}

/// Candidates split by eligibility. Borrows from the caller's slice.
#[derive(Debug, Clone, Default)]
pub struct Pools<'a> {
    pub national: Vec<&'a CandidateItem>,
    pub regional: Vec<&'a CandidateItem>,
}

impl<'a> Pools<'a> {
    /// UNSET items and regional items outside the user's region are dropped.
    ///
    /// Candidate ids must be unique across the whole input; a repeated id is
    /// rejected as a validation error before any pool is built.
    pub fn partition(candidates: &'a [CandidateItem], profile: &UserProfile) -> Result<Self> {
        let mut seen = HashSet::with_capacity(candidates.len());
        for item in candidates {
            if !seen.insert(item.id.as_str()) {
                return Err(SelectError::validation(format!(
                    "duplicate candidate id '{}'",
                    item.id
                )));
            }
        }

        let user_region = profile.region.trim();
        let mut pools = Pools::default();

        for item in candidates {
            match item.scope {
                Scope::National => pools.national.push(item),
                Scope::Regional if !user_region.is_empty() && item.region.trim() == user_region => {
                    pools.regional.push(item)
                }
                Scope::Regional | Scope::Unset => {}
            }
        }

        tracing::debug!(
            "Partitioned {} candidates: {} national, {} regional in '{}'",
            candidates.len(),
            pools.national.len(),
            pools.regional.len(),
            user_region
        );

        Ok(pools)
    }

    pub fn members(&self, pool: Pool) -> &[&'a CandidateItem] {
        match pool {
            Pool::National => &self.national,
            Pool::Regional => &self.regional,
        }
    }

    pub fn eligible(&self) -> usize {
        self.national.len() + self.regional.len()
    }

    pub fn ensure_supply(&self, total_count: usize) -> Result<()> {
        if self.eligible() < total_count {
            return Err(SelectError::InsufficientSupply {
                required: total_count,
                available: self.eligible(),
                national: self.national.len(),
                regional: self.regional.len(),
            });
        }
        Ok(())
    }
}
