//! Derived views over the article collection
//!
//! A view is a filtered, sorted list of borrowed articles. Computing one never
//! touches the source collection, and identical inputs always produce the same
//! output: sorting is stable, so ties keep store order (newest-authored first).

use std::fmt;
use std::str::FromStr;

use crate::models::{Article, Category, UnknownCategory};

/// Which categories pass the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// Ordering of the projected list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Newest publication date first
    #[default]
    Latest,
    /// Highest views + 3 x likes first
    Trending,
}

impl ViewMode {
    /// Switch between the two modes
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Latest => ViewMode::Trending,
            ViewMode::Trending => ViewMode::Latest,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Latest => f.write_str("Latest"),
            ViewMode::Trending => f.write_str("Trending"),
        }
    }
}

/// All inputs of a view besides the collection itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub category: CategoryFilter,
    pub search: String,
    pub mode: ViewMode,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether an article passes the category and text filters
    pub fn matches(&self, article: &Article) -> bool {
        self.category.matches(article.category) && matches_search(article, &self.needle())
    }

    /// Filter and sort the collection
    pub fn project<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        let needle = self.needle();
        let mut projected: Vec<&Article> = articles
            .iter()
            .filter(|a| self.category.matches(a.category) && matches_search(a, &needle))
            .collect();

        match self.mode {
            ViewMode::Latest => projected.sort_by(|a, b| b.date.cmp(&a.date)),
            ViewMode::Trending => {
                projected.sort_by(|a, b| b.trending_score().cmp(&a.trending_score()))
            }
        }
        projected
    }

    fn needle(&self) -> String {
        self.search.trim().to_lowercase()
    }
}

/// Case-insensitive substring match on title or body; an empty needle matches everything
fn matches_search(article: &Article, needle: &str) -> bool {
    needle.is_empty()
        || article.title.to_lowercase().contains(needle)
        || article.body.to_lowercase().contains(needle)
}

/// Featured articles in store order
pub fn hot(articles: &[Article]) -> impl Iterator<Item = &Article> {
    articles.iter().filter(|a| a.is_hot)
}
