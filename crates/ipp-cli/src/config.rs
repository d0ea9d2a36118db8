//! CLI configuration via environment variables
//!
//! Command-line flags always win over these defaults.

use std::env;
use std::path::PathBuf;

/// Default filter directive when `IPP_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default statistics file for `ipp run` (IPP_STATS=/path)
    pub stats_file: Option<PathBuf>,
    /// Render statistics and check results as JSON (IPP_JSON=1)
    pub default_json: bool,
    /// Disable colored output (IPP_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
    /// tracing filter directive (IPP_LOG=debug)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            stats_file: lookup("IPP_STATS")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            default_json: lookup("IPP_JSON").map(|v| is_truthy(&v)).unwrap_or(false),
            no_color: lookup("IPP_NO_COLOR").is_some() || lookup("NO_COLOR").is_some(),
            log_filter: lookup("IPP_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn is_truthy(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    !(lower.is_empty() || lower == "0" || lower == "false" || lower == "off")
}
