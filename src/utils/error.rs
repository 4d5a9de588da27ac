use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error(
        "Insufficient supply: {required} items required but only {available} eligible \
         (national pool: {national}, regional pool: {regional}); short by {}",
        required.saturating_sub(*available)
    )]
    InsufficientSupply {
        required: usize,
        available: usize,
        national: usize,
        regional: usize,
    },

    #[error("Invalid user profile: missing required field '{field}'")]
    InvalidProfile { field: String },

    #[error("Selection invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error(
        "Rule '{rule}' requires at least {required} '{category}' items but only {achieved} could be selected"
    )]
    RuleShortfall {
        rule: String,
        category: String,
        required: usize,
        achieved: usize,
    },

    #[error("Record source '{path}' {reason}")]
    SourceError { path: String, reason: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Supply,
    Profile,
    Internal,
    Source,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SelectError {
    pub fn invariant(message: impl Into<String>) -> Self {
        SelectError::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        SelectError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SelectError::InsufficientSupply { .. } | SelectError::RuleShortfall { .. } => {
                ErrorCategory::Supply
            }
            SelectError::InvalidProfile { .. } => ErrorCategory::Profile,
            SelectError::InvariantViolation { .. } => ErrorCategory::Internal,
            SelectError::SourceError { .. }
            | SelectError::CsvError(_)
            | SelectError::IoError(_)
            | SelectError::SerializationError(_)
            | SelectError::ValidationError { .. } => ErrorCategory::Source,
            SelectError::ConfigError { .. } | SelectError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SelectError::InvariantViolation { .. } => ErrorSeverity::Critical,
            SelectError::IoError(_) => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SelectError::InsufficientSupply { .. } => {
                "Add more eligible candidates or lower total_count / raise max_regional_count"
            }
            SelectError::RuleShortfall { .. } => {
                "Add candidates in the required category or disable strict_minimums"
            }
            SelectError::InvalidProfile { .. } => {
                "Make sure the profile file has non-empty id and name columns"
            }
            SelectError::InvariantViolation { .. } => {
                "This is a bug in the selection engine; please report it with the input files"
            }
            SelectError::SourceError { .. } | SelectError::IoError(_) => {
                "Check that the file exists, is readable and is not empty"
            }
            SelectError::CsvError(_) | SelectError::ValidationError { .. } => {
                "Check the CSV header and the offending row"
            }
            SelectError::SerializationError(_) => "Check the selected records for invalid data",
            SelectError::ConfigError { .. } | SelectError::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line flags"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SelectError::InsufficientSupply {
                required,
                available,
                ..
            } => format!(
                "Not enough eligible charities: need {}, found {}",
                required, available
            ),
            SelectError::InvalidProfile { field } => {
                format!("The user profile is missing '{}'", field)
            }
            SelectError::InvariantViolation { .. } => {
                format!("Internal selection error: {}", self)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_error_names_shortfall_and_pools() {
        let err = SelectError::InsufficientSupply {
            required: 12,
            available: 9,
            national: 6,
            regional: 3,
        };
        let message = err.to_string();
        assert!(message.contains("12 items required"));
        assert!(message.contains("only 9 eligible"));
        assert!(message.contains("national pool: 6"));
        assert!(message.contains("regional pool: 3"));
        assert!(message.contains("short by 3"));
        assert_eq!(err.category(), ErrorCategory::Supply);
    }

    #[test]
    fn test_invariant_is_distinct_and_critical() {
        let err = SelectError::invariant("duplicate id c-1");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let supply = SelectError::InsufficientSupply {
            required: 2,
            available: 1,
            national: 1,
            regional: 0,
        };
        assert!(supply.severity() < err.severity());
    }

    #[test]
    fn test_serialization_error_is_wrapped() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SelectError::from(source);
        assert!(matches!(err, SelectError::SerializationError(_)));
        assert_eq!(err.category(), ErrorCategory::Source);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
