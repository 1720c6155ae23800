//! Configuration loading from riskseg.toml
//!
//! Test and battery settings can be kept in a `riskseg.toml` file. The file is
//! discovered by walking up from the current directory; command-line flags
//! override it.

use riskseg_core::{BatteryConfig, TesterConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up by [`RisksegConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "riskseg.toml";

/// riskseg configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RisksegConfig {
    /// Hypothesis test settings
    #[serde(default)]
    pub analysis: TesterConfig,
    /// Scenario columns and category values
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Include the missing-value table in battery reports
    #[serde(default = "default_include_missing")]
    pub include_missing: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            include_missing: default_include_missing(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_include_missing() -> bool {
    true
}

impl RisksegConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let path = Self::find_from(std::env::current_dir().ok()?)?;
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid configuration");
                None
            }
        }
    }

    /// Nearest `riskseg.toml` at or above `dir`
    pub fn find_from(mut dir: PathBuf) -> Option<PathBuf> {
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Reject settings no test can run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let alpha = self.analysis.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            anyhow::bail!("alpha must be between 0 and 1 (exclusive), got {}", alpha);
        }
        Ok(())
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# riskseg Configuration

[analysis]
# Significance threshold; p-values strictly below it reject the null hypothesis
alpha = 0.05
# Both groups must exceed this many observations for the z-test to be used
large_sample_threshold = 30
# t-test variance assumption: "pooled" or "welch"
variance = "pooled"
# Yates' continuity correction for 2x2 chi-squared tables
yates_correction = true

[battery]
province_column = "Province"
postal_code_column = "PostalCode"
gender_column = "Gender"
# Metric compared by the risk scenarios
premium_column = "TotalPremium"
# Metric compared by the postal code margin scenario
margin_column = "TotalPremium"
male_value = "Male"
female_value = "Female"
# Gender values removed before comparing men and women
excluded_genders = ["Not Specified"]
# Run the scenarios on the rayon thread pool
parallel = true

[output]
# Default output format: human or json
format = "human"
# Append the missing-value table to battery reports
include_missing = true
"#
        .to_string()
    }
}
