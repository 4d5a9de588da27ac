use crate::config::constraints::SelectionConstraints;
use crate::config::toml_config::TomlConfig;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "charity-select")]
#[command(about = "Pick a randomized, tailored set of charities for a user")]
pub struct CliConfig {
    /// Path to the candidate charities CSV
    pub candidates: String,

    /// Path to the single-row user profile CSV
    pub profile: String,

    /// TOML file with selection limits and extra rules
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the number of charities to select
    #[arg(long)]
    pub total_count: Option<usize>,

    /// Override the maximum number of regional charities
    #[arg(long)]
    pub max_regional: Option<usize>,

    /// Fail when a rule minimum cannot be met instead of warning
    #[arg(long)]
    pub strict: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Defaults, then the TOML file if given, then command line overrides.
    pub fn load_constraints(&self) -> Result<SelectionConstraints> {
        let mut constraints = match &self.config {
            Some(path) => {
                tracing::debug!("Loading selection config from {}", path);
                TomlConfig::from_file(path)?.constraints()
            }
            None => SelectionConstraints::default(),
        };

        if let Some(total) = self.total_count {
            constraints.total_count = total;
        }
        if let Some(max_regional) = self.max_regional {
            constraints.max_regional_count = max_regional;
        }
        if self.strict {
            constraints.strict_minimums = true;
        }

        constraints.validate()?;
        Ok(constraints)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("candidates", &self.candidates)?;
        validate_path("profile", &self.profile)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}
