//! Data models for TechNova
//!
//! Defines the core data structures: Article, Comment, Category and the
//! shared like bookkeeping. Field names on the wire are camelCase so that
//! snapshots stay compatible with documents written by the web portal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Words per minute used for the read time estimate
const WORDS_PER_MINUTE: usize = 200;

/// Errors raised when user input is incomplete
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was blank
    #[error("Please fill in all fields: {0} is required")]
    MissingField(&'static str),
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            /// Borrow the identifier as a string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_id!(
    /// Opaque, unique article identifier
    ArticleId
);

opaque_id!(
    /// Comment identifier, unique within its article
    CommentId
);

/// Closed set of article categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    Web,
    Mobile,
    Security,
    Hardware,
    Gaming,
    Career,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 7] = [
        Category::Ai,
        Category::Web,
        Category::Mobile,
        Category::Security,
        Category::Hardware,
        Category::Gaming,
        Category::Career,
    ];

    /// Stable identifier used in snapshots and on the command line
    pub fn id(self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::Web => "Web",
            Category::Mobile => "Mobile",
            Category::Security => "Security",
            Category::Hardware => "Hardware",
            Category::Gaming => "Gaming",
            Category::Career => "Career",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a string names no known category
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown category '{0}'. Valid categories: AI, Web, Mobile, Security, Hardware, Gaming, Career")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    /// The user now likes the item
    Liked,
    /// The user's like was withdrawn
    Unliked,
}

/// Like counter together with the set of users behind it
///
/// The counter is never written independently of the set, and it is
/// recomputed from the set whenever a snapshot is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredReactions", rename_all = "camelCase")]
pub struct Reactions {
    likes: u32,
    liked_by_user_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredReactions {
    #[serde(default)]
    #[allow(dead_code)]
    likes: u32,
    #[serde(default)]
    liked_by_user_ids: Vec<String>,
}

impl From<StoredReactions> for Reactions {
    fn from(stored: StoredReactions) -> Self {
        let mut liked_by_user_ids: Vec<String> = Vec::with_capacity(stored.liked_by_user_ids.len());
        for id in stored.liked_by_user_ids {
            if !liked_by_user_ids.contains(&id) {
                liked_by_user_ids.push(id);
            }
        }
        Self {
            likes: liked_by_user_ids.len() as u32,
            liked_by_user_ids,
        }
    }
}

impl Reactions {
    /// Number of likes
    pub fn likes(&self) -> u32 {
        self.likes
    }

    /// Users that currently like the item, in the order they liked it
    pub fn liked_by(&self) -> &[String] {
        &self.liked_by_user_ids
    }

    /// Whether the given user currently likes the item
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by_user_ids.iter().any(|id| id == user_id)
    }

    /// Flip the given user's membership in the liker set
    pub fn toggle(&mut self, user_id: &str) -> LikeState {
        if let Some(pos) = self.liked_by_user_ids.iter().position(|id| id == user_id) {
            self.liked_by_user_ids.remove(pos);
            self.likes -= 1;
            LikeState::Unliked
        } else {
            self.liked_by_user_ids.push(user_id.to_string());
            self.likes += 1;
            LikeState::Liked
        }
    }
}

/// A comment left on an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Identifier, unique within the article
    pub id: CommentId,
    /// Display name of the commenter
    pub author: String,
    /// Comment text
    pub text: String,
    /// When the comment was written
    pub date: DateTime<Utc>,
    /// Likes on this comment
    #[serde(flatten)]
    pub reactions: Reactions,
}

impl Comment {
    /// Create a new comment with a fresh identifier and no likes
    pub fn new(author: impl Into<String>, text: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::generate(),
            author: author.into(),
            text: text.into(),
            date,
            reactions: Reactions::default(),
        }
    }
}

/// A published article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique identifier
    pub id: ArticleId,
    /// Headline
    pub title: String,
    /// Body text in the portal's lightweight markup
    #[serde(rename = "content")]
    pub body: String,
    /// One or two sentence summary
    pub summary: String,
    /// Category
    pub category: Category,
    /// Display name of the author
    pub author: String,
    /// Publication date
    pub date: NaiveDate,
    /// Cover image URL
    pub image_url: String,
    /// Number of times the article was opened
    #[serde(default)]
    pub views: u64,
    /// Likes on this article
    #[serde(flatten)]
    pub reactions: Reactions,
    /// Comments, newest first
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Free-text tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Estimated read time in minutes (0 in old snapshots, filled in on load)
    #[serde(default)]
    pub read_time: u32,
    /// Featured on the front page
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_hot: bool,
}

impl Article {
    /// Number of likes
    pub fn likes(&self) -> u32 {
        self.reactions.likes()
    }

    /// Popularity score used by the trending view: views + 3 x likes
    pub fn trending_score(&self) -> u64 {
        self.views + 3 * u64::from(self.likes())
    }

    /// Find a comment by id
    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    /// Add a tag, ignoring duplicates and blanks
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Estimate read time in whole minutes, never less than one
pub fn estimate_read_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// A podcast episode shown in the sidebar (static reference data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub host: String,
    pub duration: String,
    pub image_url: String,
    pub date: NaiveDate,
}
