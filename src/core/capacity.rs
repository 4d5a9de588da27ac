use crate::config::constraints::SelectionConstraints;
use crate::core::partition::{Pool, Pools};
use crate::utils::error::{Result, SelectError};
use rand::Rng;

/// Allocation of output slots between the two pools.
///
/// Every transition returns a new plan and re-checks that targets stay within
/// each pool's cap and claims never exceed targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPlan {
    national_target: usize,
    regional_target: usize,
    national_claimed: usize,
    regional_claimed: usize,
    national_cap: usize,
    regional_cap: usize,
}

impl CapacityPlan {
    /// Draw the initial regional/national split.
    ///
    /// Supply is checked before any randomness is consumed.
    pub fn plan<R: Rng + ?Sized>(
        pools: &Pools<'_>,
        constraints: &SelectionConstraints,
        rng: &mut R,
    ) -> Result<Self> {
        let total = constraints.total_count;
        let national_cap = pools.national.len();
        let regional_cap = constraints.max_regional_count.min(pools.regional.len());

        if national_cap + regional_cap < total {
            return Err(SelectError::InsufficientSupply {
                required: total,
                available: national_cap + regional_cap,
                national: pools.national.len(),
                regional: pools.regional.len(),
            });
        }

        let drawn_regional = rng.gen_range(0..=regional_cap);
        let mut regional_target = drawn_regional;
        let mut national_target = total.saturating_sub(regional_target);

        if national_target > national_cap {
            let surplus = national_target - national_cap;
            regional_target = (regional_target + surplus).min(regional_cap);
            national_target = national_cap;
        }

        let achievable = national_target + regional_target;
        if achievable < total {
            return Err(SelectError::InsufficientSupply {
                required: total,
                available: achievable,
                national: pools.national.len(),
                regional: pools.regional.len(),
            });
        }

        tracing::debug!(
            "Capacity plan: drew {} regional, planned {} regional + {} national",
            drawn_regional,
            regional_target,
            national_target
        );

        CapacityPlan {
            national_target,
            regional_target,
            national_claimed: 0,
            regional_claimed: 0,
            national_cap,
            regional_cap,
        }
        .checked()
    }

    pub fn target(&self, pool: Pool) -> usize {
        match pool {
            Pool::National => self.national_target,
            Pool::Regional => self.regional_target,
        }
    }

    pub fn claimed(&self, pool: Pool) -> usize {
        match pool {
            Pool::National => self.national_claimed,
            Pool::Regional => self.regional_claimed,
        }
    }

    pub fn cap(&self, pool: Pool) -> usize {
        match pool {
            Pool::National => self.national_cap,
            Pool::Regional => self.regional_cap,
        }
    }

    /// Planned slots in `pool` not yet filled.
    pub fn open(&self, pool: Pool) -> usize {
        self.target(pool) - self.claimed(pool)
    }

    pub fn open_total(&self) -> usize {
        self.open(Pool::National) + self.open(Pool::Regional)
    }

    pub fn total(&self) -> usize {
        self.national_target + self.regional_target
    }

    pub fn is_complete(&self) -> bool {
        self.open_total() == 0
    }

    /// Whether `pool` can take one more item, moving an open slot over from
    /// the other pool if its own are used up.
    pub fn can_take(&self, pool: Pool) -> bool {
        self.open(pool) > 0 || (self.open(pool.other()) > 0 && self.target(pool) < self.cap(pool))
    }

    /// Claim one slot in `pool`, rebalancing from the other pool when needed.
    pub fn claim(self, pool: Pool) -> Result<Self> {
        let mut next = self;
        if next.open(pool) == 0 {
            if !self.can_take(pool) {
                return Err(SelectError::invariant(format!(
                    "no capacity left to claim a {} slot ({:?})",
                    pool, self
                )));
            }
            next = next.with_target(pool.other(), next.target(pool.other()) - 1);
            next = next.with_target(pool, next.target(pool) + 1);
            tracing::debug!("Moved one slot from {} to {}", pool.other(), pool);
        }
        next.with_claimed(pool, next.claimed(pool) + 1).checked()
    }

    /// Claim `count` already planned slots in `pool` without rebalancing.
    pub fn fill(self, pool: Pool, count: usize) -> Result<Self> {
        if count > self.open(pool) {
            return Err(SelectError::invariant(format!(
                "cannot fill {} {} slots, only {} open",
                count,
                pool,
                self.open(pool)
            )));
        }
        self.with_claimed(pool, self.claimed(pool) + count).checked()
    }

    fn with_target(mut self, pool: Pool, target: usize) -> Self {
        match pool {
            Pool::National => self.national_target = target,
            Pool::Regional => self.regional_target = target,
        }
        self
    }

    fn with_claimed(mut self, pool: Pool, claimed: usize) -> Self {
        match pool {
            Pool::National => self.national_claimed = claimed,
            Pool::Regional => self.regional_claimed = claimed,
        }
        self
    }

    fn checked(self) -> Result<Self> {
        for pool in [Pool::National, Pool::Regional] {
            if self.target(pool) > self.cap(pool) {
                return Err(SelectError::invariant(format!(
                    "{} target {} exceeds cap {}",
                    pool,
                    self.target(pool),
                    self.cap(pool)
                )));
            }
            if self.claimed(pool) > self.target(pool) {
                return Err(SelectError::invariant(format!(
                    "{} claimed {} exceeds target {}",
                    pool,
                    self.claimed(pool),
                    self.target(pool)
                )));
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CandidateItem;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn items(national: usize, regional: usize) -> Vec<CandidateItem> {
        let mut items: Vec<CandidateItem> = (0..national)
            .map(|i| CandidateItem::national(format!("n-{i}"), "GENERAL"))
            .collect();
        items.extend((0..regional).map(|i| CandidateItem::regional(format!("r-{i}"), "North", "GENERAL")));
        items
    }

    fn pools(items: &[CandidateItem]) -> Pools<'_> {
        Pools {
            national: items.iter().filter(|i| i.region.is_empty()).collect(),
            regional: items.iter().filter(|i| !i.region.is_empty()).collect(),
        }
    }

    #[test]
    fn test_plan_respects_caps_for_many_seeds() {
        let items = items(9, 21);
        let pools = pools(&items);
        let constraints = SelectionConstraints::with_counts(12, 5);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = CapacityPlan::plan(&pools, &constraints, &mut rng).unwrap();
            assert_eq!(plan.total(), 12);
            assert!(plan.target(Pool::Regional) <= 5);
            assert!(plan.target(Pool::Regional) >= 3);
            assert!(plan.target(Pool::National) <= 9);
        }
    }

    #[test]
    fn test_plan_shifts_deficit_to_regional() {
        let items = items(8, 4);
        let pools = pools(&items);
        let constraints = SelectionConstraints::with_counts(12, 5);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = CapacityPlan::plan(&pools, &constraints, &mut rng).unwrap();
            assert_eq!(plan.target(Pool::National), 8);
            assert_eq!(plan.target(Pool::Regional), 4);
        }
    }

    #[test]
    fn test_plan_fails_when_regional_cap_blocks_supply() {
        // 20 eligible, but at most 5 may be regional.
        let items = items(6, 14);
        let pools = pools(&items);
        let constraints = SelectionConstraints::with_counts(12, 5);
        let mut rng = StdRng::seed_from_u64(1);

        match CapacityPlan::plan(&pools, &constraints, &mut rng).unwrap_err() {
            SelectError::InsufficientSupply {
                required,
                available,
                national,
                regional,
            } => assert_eq!((required, available, national, regional), (12, 11, 6, 14)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_plan_draws_nothing() {
        let items = items(6, 14);
        let pools = pools(&items);
        let constraints = SelectionConstraints::with_counts(12, 5);
        let mut used = StdRng::seed_from_u64(77);
        let mut untouched = StdRng::seed_from_u64(77);

        assert!(CapacityPlan::plan(&pools, &constraints, &mut used).is_err());
        assert_eq!(used.next_u64(), untouched.next_u64());
    }

    #[test]
    fn test_claim_rebalances_one_slot() {
        let items = items(12, 4);
        let pools = pools(&items);
        let constraints = SelectionConstraints::with_counts(12, 5);

        // Find a plan with no regional target so the claim has to move a slot.
        let plan = (0..500)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                CapacityPlan::plan(&pools, &constraints, &mut rng).unwrap()
            })
            .find(|plan| plan.target(Pool::Regional) == 0)
            .expect("some seed draws zero regional");

        let next = plan.claim(Pool::Regional).unwrap();
        assert_eq!(next.target(Pool::Regional), 1);
        assert_eq!(next.target(Pool::National), 11);
        assert_eq!(next.claimed(Pool::Regional), 1);
        assert_eq!(next.total(), 12);
        // The original plan is untouched.
        assert_eq!(plan.target(Pool::Regional), 0);
    }

    #[test]
    fn test_fill_rejects_overflow() {
        let items = items(12, 0);
        let pools = pools(&items);
        let constraints = SelectionConstraints::with_counts(12, 5);
        let mut rng = StdRng::seed_from_u64(3);
        let plan = CapacityPlan::plan(&pools, &constraints, &mut rng).unwrap();

        assert!(plan.fill(Pool::National, 12).unwrap().is_complete());
        assert!(matches!(
            plan.fill(Pool::National, 13),
            Err(SelectError::InvariantViolation { .. })
        ));
        assert!(!plan.can_take(Pool::Regional));
    }
}
