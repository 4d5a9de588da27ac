use crate::utils::error::{Result, SelectError};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a candidate may be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    National,
    Regional,
    /// Never selected.
    #[default]
    Unset,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::National => write!(f, "NATIONAL"),
            Scope::Regional => write!(f, "REGIONAL"),
            Scope::Unset => write!(f, "UNSET"),
        }
    }
}

/// A charity eligible for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub name: String,
    pub region: String,
    pub category: String,
    pub scope: Scope,
}

impl CandidateItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
        category: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: region.into(),
            category: category.into(),
            scope,
        }
    }

    pub fn national(id: impl Into<String>, category: impl Into<String>) -> Self {
        let id = id.into();
        let name = format!("Charity {}", id);
        Self::new(id, name, "", category, Scope::National)
    }

    pub fn regional(
        id: impl Into<String>,
        region: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let name = format!("Charity {}", id);
        Self::new(id, name, region, category, Scope::Regional)
    }

    /// Categories are free-form tags compared without regard to ASCII case.
    pub fn is_category(&self, category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(category.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Coerce a raw profile cell. Empty cells carry no value.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => return Some(AttributeValue::Flag(true)),
            "false" | "no" | "n" => return Some(AttributeValue::Flag(false)),
            _ => {}
        }

        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(AttributeValue::Number(number)),
            _ => Some(AttributeValue::Text(trimmed.to_string())),
        }
    }
}

/// The user a selection is made for. Read-only during a selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: region.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Missing or non-boolean attributes read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.attributes.get(key), Some(AttributeValue::Flag(true)))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key) {
            Some(AttributeValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn has_pets(&self) -> bool {
        self.flag("hasPets")
    }
}

impl Validate for UserProfile {
    fn validate(&self) -> Result<()> {
        for (field, value) in [("id", &self.id), ("name", &self.name)] {
            if value.trim().is_empty() {
                return Err(SelectError::InvalidProfile {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Outcome of one tailoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: String,
    pub category: String,
    pub required: usize,
    pub achieved: usize,
}

impl RuleOutcome {
    pub fn is_shortfall(&self) -> bool {
        self.achieved < self.required
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub user_id: String,
    pub total_count: usize,
    pub selected: usize,
    pub regional_selected: usize,
    pub national_selected: usize,
    pub national_pool: usize,
    pub regional_pool: usize,
    pub rules: Vec<RuleOutcome>,
    pub selected_at: DateTime<Utc>,
}

/// Final, randomly ordered selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub items: Vec<CandidateItem>,
    pub summary: SelectionSummary,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    pub fn count_scope(&self, scope: Scope) -> usize {
        self.items.iter().filter(|item| item.scope == scope).count()
    }

    pub fn count_category(&self, category: &str) -> usize {
        self.items
            .iter()
            .filter(|item| item.is_category(category))
            .count()
    }

    /// One JSON object per selected item, in selection order.
    pub fn json_lines(&self) -> Result<Vec<String>> {
        self.items
            .iter()
            .map(|item| serde_json::to_string(item).map_err(SelectError::from))
            .collect()
    }
}
