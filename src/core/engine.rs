use crate::config::constraints::SelectionConstraints;
use crate::core::assembler::assemble;
use crate::core::capacity::CapacityPlan;
use crate::core::ledger::DrawLedger;
use crate::core::partition::Pools;
use crate::core::sampler::fill_all;
use crate::core::tailoring::{apply_rules, default_rules, TailoringRule};
use crate::core::ConfigProvider;
use crate::domain::model::{
    CandidateItem, Scope, SelectionResult, SelectionSummary, UserProfile,
};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::Utc;
use rand::Rng;

/// Picks a randomized, tailored subset of candidates for one user.
///
/// The engine holds only configuration; every call is independent and the
/// random source is supplied per call.
pub struct SelectionEngine {
    constraints: SelectionConstraints,
    rules: Vec<Box<dyn TailoringRule>>,
}

impl SelectionEngine {
    pub fn new(constraints: SelectionConstraints) -> Result<Self> {
        constraints.validate()?;
        let rules = default_rules(&constraints);
        Ok(Self { constraints, rules })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.constraints())
    }

    /// Append a rule after the configured ones.
    pub fn with_rule(mut self, rule: impl TailoringRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn constraints(&self) -> &SelectionConstraints {
        &self.constraints
    }

    pub fn rules(&self) -> &[Box<dyn TailoringRule>] {
        &self.rules
    }

    pub fn select(
        &self,
        candidates: &[CandidateItem],
        profile: &UserProfile,
    ) -> Result<SelectionResult> {
        self.select_with_rng(candidates, profile, &mut rand::thread_rng())
    }

    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        candidates: &[CandidateItem],
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<SelectionResult> {
        profile.validate()?;
        let constraints = &self.constraints;

        // 1. Partition
        let pools = Pools::partition(candidates, profile)?;
        pools.ensure_supply(constraints.total_count)?;

        // 2. Capacity
        let plan = CapacityPlan::plan(&pools, constraints, rng)?;

        // 3. Tailoring
        let mut ledger = DrawLedger::new();
        let (plan, outcomes) = apply_rules(
            &self.rules,
            profile,
            &pools,
            plan,
            &mut ledger,
            constraints.strict_minimums,
            rng,
        )?;

        // 4. Sampling
        let plan = fill_all(&pools, plan, &mut ledger, rng)?;

        // 5. Assembly
        let items = assemble(ledger, &plan, profile, constraints, rng)?;

        let summary = SelectionSummary {
            user_id: profile.id.clone(),
            total_count: constraints.total_count,
            selected: items.len(),
            regional_selected: items.iter().filter(|i| i.scope == Scope::Regional).count(),
            national_selected: items.iter().filter(|i| i.scope == Scope::National).count(),
            national_pool: pools.national.len(),
            regional_pool: pools.regional.len(),
            rules: outcomes,
            selected_at: Utc::now(),
        };

        tracing::info!(
            "Selected {} items for user '{}' ({} regional, {} national)",
            summary.selected,
            summary.user_id,
            summary.regional_selected,
            summary.national_selected
        );

        Ok(SelectionResult { items, summary })
    }
}
