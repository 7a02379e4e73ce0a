//! Pipeline configuration
//!
//! Loaded from `groundcheck.toml` when present, otherwise defaults. The CLI
//! overlays its flags on top of whatever was loaded.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use groundcheck_llm::DEFAULT_TIMEOUT_SECS;
use groundcheck_utils::error::ConfigError;

/// Repair attempts after the initial generation, per round.
pub const DEFAULT_MAX_REPAIR_ATTEMPTS: usize = 2;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "groundcheck.toml";

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// External generator command; empty until configured.
    pub generator_command: String,
    /// Arguments passed to the generator command.
    pub generator_args: Vec<String>,
    /// Repair attempts after the initial generation, per round.
    pub max_repair_attempts: usize,
    /// Budget for a single generator call, in seconds.
    pub generator_timeout_secs: u64,
    /// Directory run artifacts are written into.
    pub output_dir: Utf8PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generator_command: String::new(),
            generator_args: Vec::new(),
            max_repair_attempts: DEFAULT_MAX_REPAIR_ATTEMPTS,
            generator_timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: Utf8PathBuf::from("groundcheck-out"),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::FileRead {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|err| ConfigError::TomlParse {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        debug!(path = %path, "loaded pipeline config");
        Ok(config)
    }

    /// Explicit path when given; else `groundcheck.toml` in the working
    /// directory when present; else built-in defaults.
    pub fn discover(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Utf8Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generator_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Per-call generation budget as a `Duration`.
    #[must_use]
    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_repair_attempts, 2);
        assert_eq!(config.generator_timeout_secs, 120);
        assert_eq!(config.output_dir, Utf8PathBuf::from("groundcheck-out"));
        assert!(config.generator_command.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groundcheck.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "generator_command = \"ollama\"").unwrap();
        writeln!(file, "generator_args = [\"run\", \"llama3\"]").unwrap();
        writeln!(file, "max_repair_attempts = 1").unwrap();

        let utf8_path = Utf8Path::from_path(path.as_path()).unwrap();
        let config = PipelineConfig::load(utf8_path).unwrap();
        assert_eq!(config.generator_command, "ollama");
        assert_eq!(config.generator_args, vec!["run", "llama3"]);
        assert_eq!(config.max_repair_attempts, 1);
        assert_eq!(config.generator_timeout_secs, 120);
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let err = PipelineConfig::load(Utf8Path::new("/no/such/groundcheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "generator_command = [unbalanced").unwrap();
        let utf8_path = Utf8Path::from_path(path.as_path()).unwrap();
        let err = PipelineConfig::load(utf8_path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "generator_timeout_secs = 0\n").unwrap();
        let utf8_path = Utf8Path::from_path(path.as_path()).unwrap();
        let err = PipelineConfig::load(utf8_path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "generator_timeout_secs"));
    }

    #[test]
    fn test_discover_without_path_or_file_uses_defaults() {
        // The test working directory has no groundcheck.toml
        let config = PipelineConfig::discover(None).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
