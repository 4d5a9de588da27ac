use crate::config::constraints::{RuleSpec, SelectionConstraints};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SelectError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub selection: SelectionSection,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSection {
    pub total_count: Option<usize>,
    pub max_regional_count: Option<usize>,
    pub pet_owner_minimum: Option<usize>,
    pub pet_owner_category: Option<String>,
    pub strict_minimums: Option<bool>,
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SelectError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SelectError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SelectError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Layer the file's values over the built-in defaults.
    pub fn to_constraints(&self) -> SelectionConstraints {
        let defaults = SelectionConstraints::default();
        let section = &self.selection;
        SelectionConstraints {
            total_count: section.total_count.unwrap_or(defaults.total_count),
            max_regional_count: section
                .max_regional_count
                .unwrap_or(defaults.max_regional_count),
            pet_owner_minimum: section
                .pet_owner_minimum
                .unwrap_or(defaults.pet_owner_minimum),
            pet_owner_category: section
                .pet_owner_category
                .clone()
                .unwrap_or(defaults.pet_owner_category),
            strict_minimums: section.strict_minimums.unwrap_or(defaults.strict_minimums),
            rules: self.rules.clone(),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn constraints(&self) -> SelectionConstraints {
        self.to_constraints()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_constraints().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_selection_config() {
        let toml_content = r#"
[selection]
total_count = 10
max_regional_count = 3
strict_minimums = true

[[rules]]
name = "parents"
attribute = "hasChildren"
category = "CHILDREN"
minimum = 2
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let constraints = config.to_constraints();

        assert_eq!(constraints.total_count, 10);
        assert_eq!(constraints.max_regional_count, 3);
        assert!(constraints.strict_minimums);
        assert_eq!(constraints.pet_owner_minimum, 4);
        assert_eq!(constraints.rules.len(), 1);
        assert_eq!(constraints.rules[0].category, "CHILDREN");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.constraints(), SelectionConstraints::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CHARITY_SELECT_TEST_TOTAL", "7");

        let toml_content = r#"
[selection]
total_count = ${CHARITY_SELECT_TEST_TOTAL}
max_regional_count = 2
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.selection.total_count, Some(7));

        std::env::remove_var("CHARITY_SELECT_TEST_TOTAL");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[selection]
total_count = 4
max_regional_count = 6
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[selection\ntotal_count = 1").unwrap_err();
        assert!(matches!(err, SelectError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[selection]\npet_owner_minimum = 0\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.to_constraints().pet_owner_minimum, 0);
    }
}
