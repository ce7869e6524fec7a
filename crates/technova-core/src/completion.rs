//! Generated summaries and titles
//!
//! The portal can ask an external text-generation service for a summary or
//! a headline. The service sits behind [`TextCompleter`]; callers go through
//! [`Assistant`], which never fails: empty answers and errors are replaced
//! by a fixed fallback string for the mode, and errors are only logged.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::draft::Draft;

/// Base URL of the Gemini API
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// What to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Summary,
    Title,
}

impl CompletionMode {
    /// Prompt sent to the model for the given article text
    pub fn prompt(self, text: &str) -> String {
        match self {
            CompletionMode::Summary => format!(
                "Write a short summary of the following IT news story. \
                 At most two sentences: {}",
                text
            ),
            CompletionMode::Title => format!(
                "Suggest a catchy headline for the following article: {}",
                text
            ),
        }
    }

    /// Returned when the service answers with nothing
    pub fn empty_fallback(self) -> &'static str {
        match self {
            CompletionMode::Summary => "Could not generate a summary.",
            CompletionMode::Title => "New IT story",
        }
    }

    /// Returned when the call fails
    pub fn error_fallback(self) -> &'static str {
        match self {
            CompletionMode::Summary => "Error while generating the AI summary.",
            CompletionMode::Title => "Untitled",
        }
    }
}

impl fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionMode::Summary => f.write_str("summary"),
            CompletionMode::Title => f.write_str("title"),
        }
    }
}

/// Errors from a text-completion backend
#[derive(Error, Debug)]
pub enum CompletionError {
    /// No API key configured
    #[error("Text completion is not configured. Set api_key or TECHNOVA_API_KEY.")]
    NotConfigured,

    /// Transport or HTTP status failure
    #[error("Completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with something we could not read
    #[error("Malformed completion response: {0}")]
    Malformed(String),
}

/// A single request/response text-completion backend
pub trait TextCompleter {
    fn complete(&self, prompt: &str)
        -> impl Future<Output = Result<String, CompletionError>> + Send;
}

/// Gemini `generateContent` backend
#[derive(Debug, Clone)]
pub struct GeminiCompleter {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiCompleter {
    /// Create a completer from configuration
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .user_agent(concat!("technova/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first candidate, or empty when there is none
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl TextCompleter for GeminiCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CompletionError::NotConfigured);
        };

        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        Ok(body.text())
    }
}

/// A generated value tied to the draft revision it was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub mode: CompletionMode,
    pub revision: u64,
    pub text: String,
}

/// Never-failing front end over a [`TextCompleter`]
#[derive(Debug, Clone)]
pub struct Assistant<C> {
    completer: C,
}

impl Assistant<GeminiCompleter> {
    /// Build the default assistant from configuration
    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        Ok(Self::new(GeminiCompleter::new(config)?))
    }
}

impl<C: TextCompleter> Assistant<C> {
    pub fn new(completer: C) -> Self {
        Self { completer }
    }

    /// Generate text for the given mode; always returns something displayable
    pub async fn generate(&self, mode: CompletionMode, text: &str) -> String {
        match self.completer.complete(&mode.prompt(text)).await {
            Ok(answer) => {
                let answer = answer.trim();
                if answer.is_empty() {
                    debug!(%mode, "completion returned no text");
                    mode.empty_fallback().to_string()
                } else {
                    answer.to_string()
                }
            }
            Err(e) => {
                warn!(%mode, error = %e, "text completion failed, using fallback");
                mode.error_fallback().to_string()
            }
        }
    }

    /// Summarize article text
    pub async fn summarize(&self, text: &str) -> String {
        self.generate(CompletionMode::Summary, text).await
    }

    /// Suggest a headline for article text
    pub async fn suggest_title(&self, text: &str) -> String {
        self.generate(CompletionMode::Title, text).await
    }

    /// Generate a suggestion for a draft's body, stamped with the draft's revision
    pub async fn suggest_for(&self, draft: &Draft, mode: CompletionMode) -> Suggestion {
        let revision = draft.revision();
        let text = self.generate(mode, draft.body()).await;
        Suggestion {
            mode,
            revision,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Completer that replays canned answers and records prompts
    struct Scripted {
        answers: Mutex<Vec<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextCompleter for Scripted {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answers.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let assistant = Assistant::new(Scripted::new(vec![Ok("  Short summary.\n".to_string())]));
        assert_eq!(assistant.summarize("body").await, "Short summary.");

        let prompts = assistant.completer.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("body"));
        assert!(prompts[0].contains("two sentences"));
    }

    #[tokio::test]
    async fn test_empty_answer_uses_empty_fallback() {
        let assistant = Assistant::new(Scripted::new(vec![
            Ok("   ".to_string()),
            Ok(String::new()),
        ]));
        assert_eq!(assistant.summarize("x").await, "Could not generate a summary.");
        assert_eq!(assistant.suggest_title("x").await, "New IT story");
    }

    #[tokio::test]
    async fn test_error_uses_error_fallback() {
        let assistant = Assistant::new(Scripted::new(vec![
            Err(CompletionError::Malformed("bad json".to_string())),
            Err(CompletionError::NotConfigured),
        ]));
        assert_eq!(
            assistant.summarize("x").await,
            "Error while generating the AI summary."
        );
        assert_eq!(assistant.suggest_title("x").await, "Untitled");
    }

    #[tokio::test]
    async fn test_unconfigured_gemini_falls_back() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        let assistant = Assistant::from_config(&config).unwrap();
        assert!(assistant.completer.api_key.is_none());
        assert_eq!(assistant.suggest_title("x").await, "Untitled");
    }

    #[tokio::test]
    async fn test_suggestion_carries_revision() {
        let mut draft = Draft::new();
        draft.set_body("Article body");
        let assistant = Assistant::new(Scripted::new(vec![Ok("Headline".to_string())]));

        let suggestion = assistant.suggest_for(&draft, CompletionMode::Title).await;
        assert_eq!(suggestion.revision, draft.revision());
        assert_eq!(suggestion.text, "Headline");
        assert!(draft.apply(suggestion));
        assert_eq!(draft.title(), "Headline");
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "Hello world");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hi" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }
}
