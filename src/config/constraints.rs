use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_COUNT: usize = 12;
pub const DEFAULT_MAX_REGIONAL_COUNT: usize = 5;
pub const DEFAULT_PET_OWNER_MINIMUM: usize = 4;
pub const DEFAULT_PET_OWNER_CATEGORY: &str = "ANIMAL";

/// A tailoring rule declared in configuration: when the profile flag
/// `attribute` is true, select at least `minimum` items of `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub attribute: String,
    pub category: String,
    pub minimum: usize,
}

/// Process-wide selection limits. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConstraints {
    pub total_count: usize,
    pub max_regional_count: usize,
    /// Zero disables the built-in pet owner rule.
    pub pet_owner_minimum: usize,
    pub pet_owner_category: String,
    /// Fail instead of warn when a rule minimum cannot be met.
    pub strict_minimums: bool,
    pub rules: Vec<RuleSpec>,
}

impl Default for SelectionConstraints {
    fn default() -> Self {
        Self {
            total_count: DEFAULT_TOTAL_COUNT,
            max_regional_count: DEFAULT_MAX_REGIONAL_COUNT,
            pet_owner_minimum: DEFAULT_PET_OWNER_MINIMUM,
            pet_owner_category: DEFAULT_PET_OWNER_CATEGORY.to_string(),
            strict_minimums: false,
            rules: Vec::new(),
        }
    }
}

impl SelectionConstraints {
    pub fn with_counts(total_count: usize, max_regional_count: usize) -> Self {
        Self {
            total_count,
            max_regional_count,
            ..Self::default()
        }
    }
}

impl ConfigProvider for SelectionConstraints {
    fn constraints(&self) -> SelectionConstraints {
        self.clone()
    }
}

impl Validate for SelectionConstraints {
    fn validate(&self) -> Result<()> {
        validate_positive_number("selection.total_count", self.total_count, 1)?;
        validate_range(
            "selection.max_regional_count",
            self.max_regional_count,
            0,
            self.total_count,
        )?;
        if self.pet_owner_minimum > 0 {
            validate_non_empty_string("selection.pet_owner_category", &self.pet_owner_category)?;
        }

        for rule in &self.rules {
            validate_non_empty_string("rules.name", &rule.name)?;
            validate_non_empty_string("rules.attribute", &rule.attribute)?;
            validate_non_empty_string("rules.category", &rule.category)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let constraints = SelectionConstraints::default();
        assert_eq!(constraints.total_count, 12);
        assert_eq!(constraints.max_regional_count, 5);
        assert!(constraints.validate().is_ok());
    }

    #[test]
    fn test_regional_cap_cannot_exceed_total() {
        assert!(SelectionConstraints::with_counts(4, 5).validate().is_err());
        assert!(SelectionConstraints::with_counts(0, 0).validate().is_err());
        assert!(SelectionConstraints::with_counts(4, 4).validate().is_ok());
    }

    #[test]
    fn test_rule_fields_must_be_present() {
        let mut constraints = SelectionConstraints::default();
        constraints.rules.push(RuleSpec {
            name: "parents".to_string(),
            attribute: "hasChildren".to_string(),
            category: " ".to_string(),
            minimum: 2,
        });
        assert!(constraints.validate().is_err());
    }
}
