//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storekeep_auth::PasswordPolicy;
use storekeep_core::config::CouponDefaults;

/// File names searched for, in order, when no `--config` is given.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["storekeep.toml", ".storekeep.toml", "storekeep.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Defaults for coupons created by scenarios.
    #[serde(default)]
    pub coupon: CouponDefaults,

    /// Password hashing parameters.
    #[serde(default)]
    pub password: PasswordPolicy,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(path, &content)
    }

    /// Parse config text, choosing the format from the file name.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Generate a default storekeep.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storekeep configuration

[coupon]
# New coupons are valid from today (00:00 UTC) for this many days.
validity_days = 90
# "P" = percentage, "V" = fixed value
kind = "P"
value = "10"
# "A" active, "I" inactive, "E" expired, "S" suspended
status = "I"
stock = 0

[password]
memory_kib = 19456
iterations = 2
parallelism = 1
default_password = "changeme"
min_length = 8
# Stored hashes asking for more than this are refused.
max_memory_kib = 262144
max_iterations = 16

[logging]
filter = "info"
"#
    .to_string()
}
