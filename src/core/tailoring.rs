use crate::config::constraints::{RuleSpec, SelectionConstraints};
use crate::core::capacity::CapacityPlan;
use crate::core::ledger::DrawLedger;
use crate::core::partition::{Pool, Pools};
use crate::domain::model::{CandidateItem, RuleOutcome, UserProfile};
use crate::utils::error::{Result, SelectError};
use rand::Rng;

/// A category minimum switched on by something in the user profile.
///
/// Rules never see the pools; the engine does the drawing.
pub trait TailoringRule: Send + Sync {
    fn applies(&self, profile: &UserProfile) -> bool;

    fn minimum_count(&self, profile: &UserProfile) -> usize;

    fn target_category(&self) -> &str;

    fn name(&self) -> &str {
        self.target_category()
    }
}

/// Pet owners see at least `minimum` animal charities.
#[derive(Debug, Clone)]
pub struct PetOwnerRule {
    minimum: usize,
    category: String,
}

impl PetOwnerRule {
    pub fn new(minimum: usize, category: impl Into<String>) -> Self {
        Self {
            minimum,
            category: category.into(),
        }
    }
}

impl TailoringRule for PetOwnerRule {
    fn applies(&self, profile: &UserProfile) -> bool {
        profile.has_pets()
    }

    fn minimum_count(&self, _profile: &UserProfile) -> usize {
        self.minimum
    }

    fn target_category(&self) -> &str {
        &self.category
    }

    fn name(&self) -> &str {
        "pet-owner"
    }
}

/// Rule declared in configuration, triggered by a boolean profile attribute.
#[derive(Debug, Clone)]
pub struct AttributeRule {
    spec: RuleSpec,
}

impl From<RuleSpec> for AttributeRule {
    fn from(spec: RuleSpec) -> Self {
        Self { spec }
    }
}

impl TailoringRule for AttributeRule {
    fn applies(&self, profile: &UserProfile) -> bool {
        profile.flag(&self.spec.attribute)
    }

    fn minimum_count(&self, _profile: &UserProfile) -> usize {
        self.spec.minimum
    }

    fn target_category(&self) -> &str {
        &self.spec.category
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Rules in declaration order: the built-in pet owner rule, then configured ones.
pub fn default_rules(constraints: &SelectionConstraints) -> Vec<Box<dyn TailoringRule>> {
    let mut rules: Vec<Box<dyn TailoringRule>> = Vec::new();
    if constraints.pet_owner_minimum > 0 {
        rules.push(Box::new(PetOwnerRule::new(
            constraints.pet_owner_minimum,
            constraints.pet_owner_category.clone(),
        )));
    }
    rules.extend(
        constraints
            .rules
            .iter()
            .cloned()
            .map(|spec| Box::new(AttributeRule::from(spec)) as Box<dyn TailoringRule>),
    );
    rules
}

/// Apply every rule that holds for `profile`, claiming matching items into
/// `ledger` and returning the adjusted plan with one outcome per applied rule.
///
/// Each unit goes to the regional or national side on a fair coin when both
/// can take it. An under-met minimum is a warning unless `strict` is set.
pub fn apply_rules<'a, R: Rng + ?Sized>(
    rules: &[Box<dyn TailoringRule>],
    profile: &UserProfile,
    pools: &Pools<'a>,
    mut plan: CapacityPlan,
    ledger: &mut DrawLedger<'a>,
    strict: bool,
    rng: &mut R,
) -> Result<(CapacityPlan, Vec<RuleOutcome>)> {
    let mut outcomes = Vec::new();

    for rule in rules {
        if !rule.applies(profile) {
            tracing::debug!("Rule '{}' does not apply", rule.name());
            continue;
        }

        let required = rule.minimum_count(profile);
        let category = rule.target_category();
        let unclaimed_matches = |pool: Pool| -> Vec<&'a CandidateItem> {
            pools
                .members(pool)
                .iter()
                .copied()
                .filter(|item| item.is_category(category) && !ledger.contains(&item.id))
                .collect()
        };
        let mut regional = unclaimed_matches(Pool::Regional);
        let mut national = unclaimed_matches(Pool::National);

        let achievable = required
            .min(regional.len() + national.len())
            .min(plan.open_total());

        let mut achieved = 0;
        while achieved < achievable {
            let regional_ok = !regional.is_empty() && plan.can_take(Pool::Regional);
            let national_ok = !national.is_empty() && plan.can_take(Pool::National);

            let pool = match (regional_ok, national_ok) {
                (true, true) => {
                    if rng.gen_bool(0.5) {
                        Pool::Regional
                    } else {
                        Pool::National
                    }
                }
                (true, false) => Pool::Regional,
                (false, true) => Pool::National,
                (false, false) => break,
            };

            let subset = match pool {
                Pool::Regional => &mut regional,
                Pool::National => &mut national,
            };
            let index = rng.gen_range(0..subset.len());
            let item = subset.swap_remove(index);

            plan = plan.claim(pool)?;
            ledger.record(pool, item)?;
            achieved += 1;
        }

        let outcome = RuleOutcome {
            rule: rule.name().to_string(),
            category: category.to_string(),
            required,
            achieved,
        };

        if outcome.is_shortfall() {
            if strict {
                return Err(SelectError::RuleShortfall {
                    rule: outcome.rule,
                    category: outcome.category,
                    required,
                    achieved,
                });
            }
            tracing::warn!(
                "Rule '{}' wanted {} '{}' items but only {} could be selected",
                outcome.rule,
                required,
                category,
                achieved
            );
        } else {
            tracing::debug!(
                "Rule '{}' selected {} '{}' items",
                outcome.rule,
                achieved,
                category
            );
        }

        outcomes.push(outcome);
    }

    Ok((plan, outcomes))
}
