//! TOML-based configuration for markerfix.
//!
//! Every section is optional; a missing file or section falls back to the
//! built-in defaults. The CLI looks for `markerfix.toml` in the working
//! directory unless `--config` names a file explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::braces::DEFAULT_COMMENT_PREFIX;
use crate::errors::ConfigError;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "markerfix.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerfixConfig {
    /// Logging settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Conflict resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Brace counting settings.
    #[serde(default)]
    pub braces: BracesConfig,
}

// ---------------------------------------------------------------------------
// General
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Minimum tracing level: trace, debug, info, warn, error, off.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Files processed by `resolve` and `check` when no paths are passed on
    /// the command line. Relative paths are taken from the working
    /// directory.
    #[serde(default)]
    pub targets: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Braces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracesConfig {
    /// Text after this prefix is ignored. Empty disables comment stripping.
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
}

fn default_comment_prefix() -> String {
    DEFAULT_COMMENT_PREFIX.into()
}

impl Default for BracesConfig {
    fn default() -> Self {
        Self {
            comment_prefix: default_comment_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl MarkerfixConfig {
    /// Load a [`MarkerfixConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: MarkerfixConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!(targets = config.resolve.targets.len(), "configuration parsed successfully");
        Ok(config)
    }

    /// Load the configuration the CLI should use.
    ///
    /// An explicit path must exist. Without one, `markerfix.toml` in `dir`
    /// is used if present, otherwise the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::load_from_file(candidate)
                } else {
                    debug!("no configuration file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load, then validate.
    pub fn load_and_validate(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let config = Self::discover(explicit, dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that all values are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.general.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".into(),
                detail: format!(
                    "'{}' is not one of {}",
                    self.general.log_level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if let Some(idx) = self
            .resolve
            .targets
            .iter()
            .position(|t| t.as_os_str().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: format!("resolve.targets[{}]", idx),
                detail: "target path must not be empty".into(),
            });
        }

        Ok(())
    }

    /// The commented template written by `markerfix init`.
    pub fn template() -> &'static str {
        r##"# markerfix configuration

[general]
# trace | debug | info | warn | error | off (RUST_LOG overrides this)
log_level = "warn"

[resolve]
# Files handled by `markerfix resolve` / `markerfix check` when no paths
# are given on the command line.
targets = []

[braces]
# Text after this prefix on a line is not counted. "" counts everything.
comment_prefix = "//"
"##
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r##"
[general]
log_level = "debug"

[resolve]
targets = [
    "core/src/main/kotlin/com/typingtoucan/screens/GameScreen.kt",
    "core/src/main/kotlin/com/typingtoucan/Main.kt",
]

[braces]
comment_prefix = "#"
"##
    }

    #[test]
    fn test_parse_full_config() {
        let config: MarkerfixConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.resolve.targets.len(), 2);
        assert_eq!(
            config.resolve.targets[0],
            PathBuf::from("core/src/main/kotlin/com/typingtoucan/screens/GameScreen.kt")
        );
        assert_eq!(config.braces.comment_prefix, "#");
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: MarkerfixConfig = toml::from_str("").unwrap();
        assert_eq!(config, MarkerfixConfig::default());
        assert_eq!(config.general.log_level, "warn");
        assert!(config.resolve.targets.is_empty());
        assert_eq!(config.braces.comment_prefix, "//");
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: MarkerfixConfig = toml::from_str(MarkerfixConfig::template()).unwrap();
        assert_eq!(config, MarkerfixConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markerfix.toml");
        std::fs::write(&path, sample_toml()).unwrap();

        let config = MarkerfixConfig::load_from_file(&path).unwrap();
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn test_file_not_found() {
        let result = MarkerfixConfig::load_from_file("/nonexistent/markerfix.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markerfix.toml");
        std::fs::write(&path, "[general\nlog_level = 3").unwrap();

        let result = MarkerfixConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_discover_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[general]\nlog_level = \"info\"\n").unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), sample_toml()).unwrap();

        let config = MarkerfixConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.general.log_level, "info");

        let config = MarkerfixConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MarkerfixConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, MarkerfixConfig::default());

        let missing = dir.path().join("missing.toml");
        let result = MarkerfixConfig::discover(Some(&missing), dir.path());
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = MarkerfixConfig::default();
        config.general.log_level = "loud".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_level"));

        config.general.log_level = "INFO".into();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let mut config = MarkerfixConfig::default();
        config.resolve.targets = vec![PathBuf::from("a.kt"), PathBuf::new()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("resolve.targets[1]"));
    }
}
