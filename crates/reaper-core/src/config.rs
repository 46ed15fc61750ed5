//! Configuration for the default deleter wiring.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default state root holding sandbox records and ID mappings.
pub const DEFAULT_ROOT: &str = "/run/reaper";

/// Default timeout for a post-stop hook that does not set its own.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "reaper=info";

/// Configuration for reaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaperConfig {
    /// State root holding `sbs/` and `mapping/`.
    pub root: PathBuf,

    /// Timeout applied to post-stop hooks without an explicit timeout.
    pub hook_timeout: Duration,

    /// Tracing filter directive.
    pub log_filter: String,
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("state root not found: {0}")]
    MissingRoot(PathBuf),

    #[error("hook timeout must be > 0")]
    ZeroHookTimeout,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ReaperConfig {
    /// Create a new config builder.
    pub fn builder() -> ReaperConfigBuilder {
        ReaperConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `REAPER_ROOT` | `/run/reaper` |
    /// | `REAPER_HOOK_TIMEOUT_SECS` | `30` |
    /// | `REAPER_LOG` | `reaper=info` |
    ///
    /// A hook timeout that is zero or not a number falls back to the default.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            root: std::env::var("REAPER_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.root),
            hook_timeout: parse_hook_timeout(std::env::var("REAPER_HOOK_TIMEOUT_SECS").ok())
                .unwrap_or(default.hook_timeout),
            log_filter: std::env::var("REAPER_LOG").unwrap_or(default.log_filter),
        }
    }

    /// Validate the configuration.
    ///
    /// The state root must already exist: reaper only tears down what a
    /// runtime created there.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hook_timeout.is_zero() {
            return Err(ConfigError::ZeroHookTimeout);
        }
        if !self.root.exists() {
            return Err(ConfigError::MissingRoot(self.root.clone()));
        }
        Ok(())
    }

    /// Validate configuration but only log warnings instead of failing.
    pub fn validate_warn(&self) {
        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "Configuration problem");
        }
    }
}

fn parse_hook_timeout(value: Option<String>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Builder for ReaperConfig.
#[derive(Debug, Default)]
pub struct ReaperConfigBuilder {
    config: ReaperConfig,
}

impl ReaperConfigBuilder {
    /// Set the state root.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root = path.into();
        self
    }

    /// Set the default post-stop hook timeout.
    pub fn hook_timeout(mut self, timeout: Duration) -> Self {
        self.config.hook_timeout = timeout;
        self
    }

    /// Set the tracing filter.
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<ReaperConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ReaperConfig::default();
        assert_eq!(config.root, PathBuf::from("/run/reaper"));
        assert_eq!(config.hook_timeout, Duration::from_secs(30));
        assert_eq!(config.log_filter, "reaper=info");
    }

    #[test]
    fn test_builder_validation_missing_root() {
        let result = ReaperConfig::builder()
            .root("/definitely/not/a/reaper/root")
            .build();
        assert!(matches!(result, Err(ConfigError::MissingRoot(_))));
    }

    #[test]
    fn test_builder_validation_zero_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        let result = ReaperConfig::builder()
            .root(tmp.path())
            .hook_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::ZeroHookTimeout)));
    }

    #[test]
    fn test_builder_success() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ReaperConfig::builder()
            .root(tmp.path())
            .hook_timeout(Duration::from_secs(5))
            .log_filter("reaper=debug")
            .build()
            .expect("should build successfully");

        assert_eq!(config.root, tmp.path());
        assert_eq!(config.hook_timeout, Duration::from_secs(5));
        assert_eq!(config.log_filter, "reaper=debug");
    }

    #[test]
    fn test_hook_timeout_env_value() {
        assert_eq!(
            parse_hook_timeout(Some("12".into())),
            Some(Duration::from_secs(12))
        );
        assert_eq!(parse_hook_timeout(Some("0".into())), None);
        assert_eq!(parse_hook_timeout(Some("soon".into())), None);
        assert_eq!(parse_hook_timeout(None), None);
    }
}
