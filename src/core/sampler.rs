use crate::core::capacity::CapacityPlan;
use crate::core::ledger::DrawLedger;
use crate::core::partition::{Pool, Pools};
use crate::domain::model::CandidateItem;
use crate::utils::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;

/// Fill the open slots of `pool` with a uniform draw, without replacement,
/// from the members not already in `ledger`.
pub fn fill_pool<'a, R: Rng + ?Sized>(
    pool: Pool,
    pools: &Pools<'a>,
    plan: CapacityPlan,
    ledger: &mut DrawLedger<'a>,
    rng: &mut R,
) -> Result<CapacityPlan> {
    let open = plan.open(pool);
    let mut remaining: Vec<&'a CandidateItem> = pools
        .members(pool)
        .iter()
        .copied()
        .filter(|item| !ledger.contains(&item.id))
        .collect();

    let picked: Vec<&'a CandidateItem> = if open >= remaining.len() {
        if open > remaining.len() {
            tracing::debug!(
                "{} pool has {} unclaimed items for {} open slots; taking all",
                pool,
                remaining.len(),
                open
            );
        }
        remaining.shuffle(rng);
        remaining
    } else {
        remaining.choose_multiple(rng, open).copied().collect()
    };

    let count = picked.len();
    for item in picked {
        ledger.record(pool, item)?;
    }

    tracing::debug!("Sampled {} items from the {} pool", count, pool);
    plan.fill(pool, count)
}

/// Fill both pools, regional first.
pub fn fill_all<'a, R: Rng + ?Sized>(
    pools: &Pools<'a>,
    plan: CapacityPlan,
    ledger: &mut DrawLedger<'a>,
    rng: &mut R,
) -> Result<CapacityPlan> {
    let plan = fill_pool(Pool::Regional, pools, plan, ledger, rng)?;
    fill_pool(Pool::National, pools, plan, ledger, rng)
}
