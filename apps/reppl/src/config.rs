//! # Configuration
//!
//! Settings are resolved in layers, highest precedence first:
//!
//! 1. command-line flags (`--project`, `--engine`)
//! 2. environment variables (`REPPL_PROJECT`, `REPPL_ENGINE`)
//! 3. `reppl.toml` in the working directory
//! 4. built-in defaults
//!
//! ```toml
//! # reppl.toml
//! project = ".reppl"
//! engine = "repeatr run --ignore-job-exit"
//! ```

use reppl_core::ReppError;
use reppl_core::primitives::PROJECT_FILE_NAME;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "reppl.toml";

/// Engine command used when nothing else is configured.
///
/// The pin file path is appended as the final argument.
pub const DEFAULT_ENGINE: &str = "repeatr run --ignore-job-exit";

/// Environment variable overriding the project file path.
pub const ENV_PROJECT: &str = "REPPL_PROJECT";

/// Environment variable overriding the engine command.
pub const ENV_ENGINE: &str = "REPPL_ENGINE";

/// Contents of `reppl.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub project: Option<PathBuf>,
    pub engine: Option<String>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ReppError> {
        toml::from_str(text)
            .map_err(|e| ReppError::Decode(format!("invalid {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Read a config file; a missing file is an empty config.
    pub fn read(path: &Path) -> Result<Self, ReppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReppError::Io(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the project file.
    pub project: PathBuf,
    /// Engine program followed by its leading arguments.
    pub engine: Vec<String>,
}

impl Config {
    /// Resolve from flags, the process environment and `reppl.toml`.
    pub fn load(
        flag_project: Option<PathBuf>,
        flag_engine: Option<String>,
    ) -> Result<Self, ReppError> {
        let file = FileConfig::read(Path::new(CONFIG_FILE_NAME))?;
        Self::resolve(flag_project, flag_engine, |key| std::env::var(key).ok(), file)
    }

    /// Resolve from explicit sources.
    pub fn resolve(
        flag_project: Option<PathBuf>,
        flag_engine: Option<String>,
        env: impl Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> Result<Self, ReppError> {
        let project = flag_project
            .or_else(|| env(ENV_PROJECT).map(PathBuf::from))
            .or(file.project)
            .unwrap_or_else(|| PathBuf::from(PROJECT_FILE_NAME));

        let engine_line = flag_engine
            .or_else(|| env(ENV_ENGINE))
            .or(file.engine)
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string());
        let engine: Vec<String> = engine_line.split_whitespace().map(String::from).collect();
        if engine.is_empty() {
            return Err(ReppError::Usage("engine command is empty".to_string()));
        }

        Ok(Self { project, engine })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = Config::resolve(None, None, no_env, FileConfig::default()).expect("resolve");
        assert_eq!(config.project, PathBuf::from(".reppl"));
        assert_eq!(config.engine, vec!["repeatr", "run", "--ignore-job-exit"]);
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let file = FileConfig {
            project: Some("from-file".into()),
            engine: Some("file-engine".into()),
        };
        let env = |key: &str| match key {
            ENV_PROJECT => Some("from-env".to_string()),
            _ => None,
        };

        let config =
            Config::resolve(None, None, env, file.clone()).expect("resolve");
        assert_eq!(config.project, PathBuf::from("from-env"));
        assert_eq!(config.engine, vec!["file-engine"]);

        let config = Config::resolve(Some("from-flag".into()), None, env, file)
            .expect("resolve");
        assert_eq!(config.project, PathBuf::from("from-flag"));
    }

    #[test]
    fn blank_engine_is_usage_error() {
        let result = Config::resolve(None, Some("   ".into()), no_env, FileConfig::default());
        assert!(matches!(result, Err(ReppError::Usage(_))));
    }

    #[test]
    fn toml_file_parses() {
        let file = FileConfig::from_toml_str("engine = \"sh run.sh\"\n").expect("parse");
        assert_eq!(file.engine.as_deref(), Some("sh run.sh"));
        assert!(file.project.is_none());

        assert!(FileConfig::from_toml_str("engine = 3").is_err());
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = FileConfig::read(&dir.path().join(CONFIG_FILE_NAME)).expect("read");
        assert_eq!(file, FileConfig::default());
    }
}
