//! Portal configuration
//!
//! Values come from built-in defaults, then `config.toml` under the user's
//! config directory, then `TECHNOVA_*` environment variables. Later sources win.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "TECHNOVA";

/// Model used for summaries and title suggestions
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Seconds to wait for a completion before giving up
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 20;

const ARTICLES_FILE: &str = "news.json";
const SESSION_FILE: &str = "user.json";
const DEBUG_LOG_FILE: &str = "debug.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the article and session snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key for the text-completion service; suggestions fall back without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,

    /// Where the terminal UI writes its log when `TECHNOVA_LOG` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_key: None,
            model: default_model(),
            completion_timeout_secs: DEFAULT_COMPLETION_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

fn env_var(suffix: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{suffix}")).ok()
}

/// Empty means "unset" for optional settings
fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl Config {
    /// Load from the default config file, or from `TECHNOVA_CONFIG` when set
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `--config` when given, otherwise the default location
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        config_path.map_or_else(Self::load, |path| Self::load_from_path(path))
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    /// Creates the data directory.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", config.data_dir))?;
        Ok(config)
    }

    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(toml_content).context("Invalid config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(dir) = env_var("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = env_var("API_KEY") {
            self.api_key = non_empty(key);
        }
        if let Some(model) = env_var("MODEL").and_then(non_empty) {
            self.model = model;
        }
        if let Some(log) = env_var("LOG_FILE") {
            self.log_file = non_empty(log).map(PathBuf::from);
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to encode config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))
    }

    /// `TECHNOVA_CONFIG`, or `technova/config.toml` in the platform config dir
    pub fn config_file_path() -> PathBuf {
        env_var("CONFIG").map(PathBuf::from).unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("technova")
                .join("config.toml")
        })
    }

    /// Article collection snapshot
    pub fn articles_path(&self) -> PathBuf {
        self.data_dir.join(ARTICLES_FILE)
    }

    /// Signed-in user snapshot
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEBUG_LOG_FILE))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("technova")
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_completion_timeout() -> u64 {
    DEFAULT_COMPLETION_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Holds the env lock with every `TECHNOVA_*` variable cleared, restoring
    /// the previous values on drop
    struct IsolatedEnv {
        previous: Vec<(&'static str, Option<String>)>,
        _lock: MutexGuard<'static, ()>,
    }

    impl IsolatedEnv {
        fn new(vars: &[&'static str]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let previous = vars.iter().map(|&var| (var, env::var(var).ok())).collect();
            vars.iter().for_each(|var| env::remove_var(var));
            Self {
                previous,
                _lock: lock,
            }
        }
    }

    impl Drop for IsolatedEnv {
        fn drop(&mut self) {
            for (var, old) in self.previous.drain(..) {
                match old {
                    Some(value) => env::set_var(var, value),
                    None => env::remove_var(var),
                }
            }
        }
    }

    const ENV_VARS: &[&'static str] = &[
        "TECHNOVA_DATA_DIR",
        "TECHNOVA_API_KEY",
        "TECHNOVA_MODEL",
        "TECHNOVA_LOG_FILE",
        "TECHNOVA_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(!config.has_api_key());
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert_eq!(config.completion_timeout_secs, 20);
        assert!(config.data_dir.ends_with("technova"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/technova"),
            ..Config::default()
        };

        assert_eq!(config.articles_path(), PathBuf::from("/data/technova/news.json"));
        assert_eq!(config.session_path(), PathBuf::from("/data/technova/user.json"));
        assert_eq!(config.log_path(), PathBuf::from("/data/technova/debug.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/var/log/tn.log")),
            ..config
        };
        assert_eq!(config.log_path(), PathBuf::from("/var/log/tn.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _env = IsolatedEnv::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("TECHNOVA_DATA_DIR", "/tmp/technova-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/technova-test"));
    }

    #[test]
    fn test_env_override_api_key() {
        let _env = IsolatedEnv::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("TECHNOVA_API_KEY", "secret");
        config.apply_env_overrides();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(config.has_api_key());

        // Empty string clears it
        env::set_var("TECHNOVA_API_KEY", "");
        config.apply_env_overrides();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_env_override_model_ignores_empty() {
        let _env = IsolatedEnv::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TECHNOVA_MODEL", "");
        config.apply_env_overrides();
        assert_eq!(config.model, DEFAULT_MODEL);

        env::set_var("TECHNOVA_MODEL", "gemini-2.5-pro");
        config.apply_env_overrides();
        assert_eq!(config.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_serialization() {
        let _env = IsolatedEnv::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/technova"),
            api_key: Some("k".to_string()),
            model: "m".to_string(),
            completion_timeout_secs: 5,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("api_key"));
        assert!(!toml_str.contains("log_file"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.api_key, config.api_key);
        assert_eq!(parsed.completion_timeout_secs, 5);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _env = IsolatedEnv::new(ENV_VARS);

        let config = Config::load_from_str(r#"data_dir = "/custom/data""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.completion_timeout_secs, DEFAULT_COMPLETION_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _env = IsolatedEnv::new(ENV_VARS);
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        env::set_var("TECHNOVA_DATA_DIR", &data_dir);

        let config = Config::load_from_path(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(config.data_dir, data_dir);
        assert!(data_dir.exists());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let _env = IsolatedEnv::new(ENV_VARS);
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp.path().join("data"),
            model: "custom-model".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.model, "custom-model");
    }
}
