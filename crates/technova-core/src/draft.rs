//! Article drafts
//!
//! A `Draft` holds the authoring form's state until it is published. Every
//! edit bumps a revision counter so that text-completion results requested
//! against an older revision can be recognised and dropped.

use tracing::debug;

use crate::completion::{CompletionMode, Suggestion};
use crate::models::{Category, ValidationError};

/// Cover image used when the author does not pick one
pub const DEFAULT_COVER_IMAGE: &str = "https://picsum.photos/seed/tech/800/400";

/// An unpublished article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    title: String,
    body: String,
    summary: String,
    category: Category,
    image_url: String,
    tags: Vec<String>,
    is_hot: bool,
    revision: u64,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            summary: String::new(),
            category: Category::Ai,
            image_url: DEFAULT_COVER_IMAGE.to_string(),
            tags: Vec::new(),
            is_hot: false,
            revision: 0,
        }
    }
}

impl Draft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_hot(&self) -> bool {
        self.is_hot
    }

    /// Current revision; increases with every edit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.revision += 1;
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.revision += 1;
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
        self.revision += 1;
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.revision += 1;
    }

    /// Set the cover image; a blank value restores the default
    pub fn set_image_url(&mut self, image_url: impl Into<String>) {
        let image_url = image_url.into();
        self.image_url = if image_url.trim().is_empty() {
            DEFAULT_COVER_IMAGE.to_string()
        } else {
            image_url
        };
        self.revision += 1;
    }

    /// Add a tag, ignoring duplicates and blanks
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
            self.revision += 1;
        }
    }

    pub fn set_hot(&mut self, is_hot: bool) {
        self.is_hot = is_hot;
        self.revision += 1;
    }

    /// Check the required fields: title, body and summary must not be blank
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.body.trim().is_empty() {
            return Err(ValidationError::MissingField("body"));
        }
        if self.summary.trim().is_empty() {
            return Err(ValidationError::MissingField("summary"));
        }
        Ok(())
    }

    /// Apply a generated suggestion if the draft has not changed since it was requested
    ///
    /// Returns `false` when the suggestion is stale and was discarded.
    pub fn apply(&mut self, suggestion: Suggestion) -> bool {
        if suggestion.revision != self.revision {
            debug!(
                requested_at = suggestion.revision,
                current = self.revision,
                "discarding stale {} suggestion",
                suggestion.mode
            );
            return false;
        }

        match suggestion.mode {
            CompletionMode::Summary => self.set_summary(suggestion.text),
            CompletionMode::Title => self.set_title(suggestion.text),
        }
        true
    }
}
