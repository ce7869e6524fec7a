//! Text completion command handler

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use technova_core::{Assistant, CompletionMode, Config};

use crate::output::{Output, OutputFormat};

/// Input for `technova suggest`
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Text to work from (reads --file or stdin when omitted)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,
    /// Read the text from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl SuggestArgs {
    fn read_text(self) -> Result<String> {
        if let Some(text) = self.text {
            return Ok(text);
        }
        if let Some(path) = self.file {
            return fs::read_to_string(&path)
                .with_context(|| format!("Failed to read file: {:?}", path));
        }

        let stdin = io::stdin();
        if stdin.is_terminal() {
            bail!("No text given. Pass it as an argument, with --file, or on stdin.");
        }
        let mut text = String::new();
        stdin
            .lock()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    }
}

/// Generate a summary or title; failures produce the fallback text, never an error
pub async fn suggest(
    config: &Config,
    mode: CompletionMode,
    args: SuggestArgs,
    output: &Output,
) -> Result<()> {
    let text = args.read_text()?;
    if text.trim().is_empty() {
        bail!("Nothing to work from: the text is empty.");
    }
    if !config.has_api_key() {
        tracing::warn!("no API key configured; set TECHNOVA_API_KEY or `technova config set api_key`");
    }

    let assistant = Assistant::from_config(config).context("Failed to set up text completion")?;
    let suggestion = assistant.generate(mode, &text).await;

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "mode": mode.to_string(),
            "text": suggestion
        })),
        OutputFormat::Human | OutputFormat::Quiet => println!("{}", suggestion),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_prefers_argument() {
        let args = SuggestArgs {
            text: Some("inline".to_string()),
            file: None,
        };
        assert_eq!(args.read_text().unwrap(), "inline");
    }

    #[test]
    fn test_read_text_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("body.md");
        fs::write(&path, "from a file").unwrap();

        let args = SuggestArgs {
            text: None,
            file: Some(path),
        };
        assert_eq!(args.read_text().unwrap(), "from a file");
    }

    #[tokio::test]
    async fn test_suggest_without_api_key_still_succeeds() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        let args = SuggestArgs {
            text: Some("Some article text".to_string()),
            file: None,
        };
        suggest(
            &config,
            CompletionMode::Title,
            args,
            &Output::new(OutputFormat::Quiet),
        )
        .await
        .unwrap();
    }
}
