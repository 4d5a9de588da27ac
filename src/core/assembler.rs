use crate::config::constraints::SelectionConstraints;
use crate::core::capacity::CapacityPlan;
use crate::core::ledger::DrawLedger;
use crate::core::partition::Pool;
use crate::domain::model::{CandidateItem, UserProfile};
use crate::utils::error::{Result, SelectError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Check the drawn set against the plan and return it in shuffled order.
///
/// Any failure here is an `InvariantViolation`; supply problems are caught
/// before the first draw.
pub fn assemble<R: Rng + ?Sized>(
    ledger: DrawLedger<'_>,
    plan: &CapacityPlan,
    profile: &UserProfile,
    constraints: &SelectionConstraints,
    rng: &mut R,
) -> Result<Vec<CandidateItem>> {
    if !plan.is_complete() {
        return Err(SelectError::invariant(format!(
            "capacity plan still has {} open slots",
            plan.open_total()
        )));
    }
    if ledger.len() != plan.total() {
        return Err(SelectError::invariant(format!(
            "final count {} does not match planned total {}",
            ledger.len(),
            plan.total()
        )));
    }

    for pool in [Pool::National, Pool::Regional] {
        if ledger.count(pool) != plan.claimed(pool) {
            return Err(SelectError::invariant(format!(
                "{} items drawn from the {} pool but {} claimed",
                ledger.count(pool),
                pool,
                plan.claimed(pool)
            )));
        }
    }

    let regional = ledger.count(Pool::Regional);
    if regional > constraints.max_regional_count {
        return Err(SelectError::invariant(format!(
            "{} regional items exceed the limit of {}",
            regional, constraints.max_regional_count
        )));
    }

    let mut seen = HashSet::with_capacity(ledger.len());
    for (pool, item) in ledger.entries() {
        if !seen.insert(item.id.as_str()) {
            return Err(SelectError::invariant(format!(
                "duplicate id '{}' in result",
                item.id
            )));
        }
        if item.scope != pool.scope() {
            return Err(SelectError::invariant(format!(
                "'{}' has scope {} but was drawn from the {} pool",
                item.id, item.scope, pool
            )));
        }
        if *pool == Pool::Regional && item.region.trim() != profile.region.trim() {
            return Err(SelectError::invariant(format!(
                "regional item '{}' is in '{}', not the user's region '{}'",
                item.id, item.region, profile.region
            )));
        }
    }

    let mut items: Vec<CandidateItem> = ledger
        .entries()
        .iter()
        .map(|(_, item)| (*item).clone())
        .collect();
    items.shuffle(rng);
    Ok(items)
}
