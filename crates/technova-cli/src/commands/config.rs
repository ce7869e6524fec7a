//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use technova_core::Config;

use crate::output::{Output, OutputFormat};

/// Valid keys for `technova config set`
const KEYS: &str = "data_dir, api_key, model, completion_timeout_secs, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "data_dir": config.data_dir,
                "api_key_set": config.has_api_key(),
                "model": config.model,
                "completion_timeout_secs": config.completion_timeout_secs,
                "log_file": config.log_file
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:                {}", config.data_dir.display());
            println!(
                "  api_key:                 {}",
                config.api_key.as_deref().map_or("(not set)".to_string(), mask)
            );
            println!("  model:                   {}", config.model);
            println!("  completion_timeout_secs: {}", config.completion_timeout_secs);
            println!(
                "  log_file:                {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("(default: {})", config.log_path().display()))
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "api_key" && !value.is_empty() {
        mask(&value)
    } else {
        value
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

/// Update one key; empty or "none" clears optional values
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let optional = |value: &str| {
        if value.is_empty() || value == "none" {
            None
        } else {
            Some(value.to_string())
        }
    };

    match key {
        "data_dir" => config.data_dir = value.into(),
        "api_key" => config.api_key = optional(value),
        "model" => {
            if value.trim().is_empty() {
                bail!("model cannot be empty");
            }
            config.model = value.trim().to_string();
        }
        "completion_timeout_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for completion_timeout_secs. Use a whole number of seconds.")?;
            if secs == 0 {
                bail!("completion_timeout_secs must be at least 1");
            }
            config.completion_timeout_secs = secs;
        }
        "log_file" => config.log_file = optional(value).map(PathBuf::from),
        _ => bail!(
            "Unknown configuration key: '{}'\nValid keys: {}",
            key,
            KEYS
        ),
    }
    Ok(())
}

/// Hide all but the last four characters of a secret
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "model", "gemini-pro").unwrap();
        assert_eq!(config.model, "gemini-pro");

        apply(&mut config, "completion_timeout_secs", "5").unwrap();
        assert_eq!(config.completion_timeout_secs, 5);

        apply(&mut config, "api_key", "abc123").unwrap();
        assert!(config.has_api_key());
        apply(&mut config, "api_key", "none").unwrap();
        assert!(!config.has_api_key());

        apply(&mut config, "log_file", "/tmp/t.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/t.log")));
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "completion_timeout_secs", "soon").is_err());
        assert!(apply(&mut config, "completion_timeout_secs", "0").is_err());
        assert!(apply(&mut config, "model", " ").is_err());
        assert!(apply(&mut config, "sync_url", "x").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        Config {
            data_dir: data_dir.clone(),
            ..Config::default()
        }
        .save_to_path(&path)
        .unwrap();

        set(
            "model".to_string(),
            "gemini-custom".to_string(),
            Some(&path),
            &Output::new(OutputFormat::Quiet),
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("gemini-custom"));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("secret-key-1234"), "****1234");
    }
}
