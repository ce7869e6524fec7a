//! Built-in reference data
//!
//! The category taxonomy, the articles a fresh installation starts with,
//! and the static podcast list. None of this is user-editable.

use chrono::NaiveDate;

use crate::models::{estimate_read_time, Article, ArticleId, Category, Podcast, Reactions};

/// Display metadata for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub category: Category,
    pub label: &'static str,
    pub icon: &'static str,
}

/// The compile-time category taxonomy, in display order
pub const CATEGORIES: [CategoryInfo; 7] = [
    CategoryInfo {
        category: Category::Ai,
        label: "AI",
        icon: "fa-brain",
    },
    CategoryInfo {
        category: Category::Web,
        label: "Web",
        icon: "fa-globe",
    },
    CategoryInfo {
        category: Category::Mobile,
        label: "Mobile",
        icon: "fa-mobile-screen",
    },
    CategoryInfo {
        category: Category::Security,
        label: "Security",
        icon: "fa-shield-halved",
    },
    CategoryInfo {
        category: Category::Hardware,
        label: "Hardware",
        icon: "fa-microchip",
    },
    CategoryInfo {
        category: Category::Gaming,
        label: "Gaming",
        icon: "fa-gamepad",
    },
    CategoryInfo {
        category: Category::Career,
        label: "Career",
        icon: "fa-briefcase",
    },
];

impl Category {
    /// Display metadata for this category
    pub fn info(self) -> &'static CategoryInfo {
        // CATEGORIES is declared in the same order as Category::ALL
        &CATEGORIES[self as usize]
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        self.info().label
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    title: &str,
    summary: &str,
    body: &str,
    category: Category,
    author: &str,
    published: NaiveDate,
    image_url: &str,
    views: u64,
    tags: &[&str],
) -> Article {
    Article {
        id: ArticleId::from(id),
        title: title.to_string(),
        body: body.to_string(),
        summary: summary.to_string(),
        category,
        author: author.to_string(),
        date: published,
        image_url: image_url.to_string(),
        views,
        reactions: Reactions::default(),
        comments: Vec::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        read_time: estimate_read_time(body),
        is_hot: false,
    }
}

/// Articles shown when no snapshot has been saved yet
pub fn default_articles() -> Vec<Article> {
    let mut articles = vec![
        seed(
            "1",
            "Gemini 3: a new breakthrough in context understanding",
            "Google announced Gemini 3 with an unprecedented context window of 10 million tokens.",
            "# Gemini 3\n\
             Google keeps its lead in the AI market with **Gemini 3**. The new model can analyse \
             entire code libraries in seconds.\n\
             \n\
             > Developers say this will change how complex software systems are built.",
            Category::Ai,
            "Alexey Petrov",
            date(2024, 5, 20),
            "https://picsum.photos/seed/ai/800/400",
            1240,
            &["ai", "llm"],
        ),
        seed(
            "2",
            "React 19: what should developers expect?",
            "The main changes in the new release of the popular library: React Compiler and Server Actions.",
            "## React Compiler\n\
             React 19 promises to be one of the largest updates in years. The headline feature is \
             the _React Compiler_, which optimises component rendering automatically without \
             `useMemo` and `useCallback`.\n\
             \n\
             Read the [release notes](https://react.dev/blog) for details.",
            Category::Web,
            "Marina Sokolova",
            date(2024, 5, 18),
            "https://picsum.photos/seed/react/800/400",
            3500,
            &["react", "frontend"],
        ),
        seed(
            "3",
            "New ransomware targets Linux servers",
            "Security researchers found a new threat that exploits weaknesses in SSH deployments.",
            "Attackers have started using a new strain of malware built specifically for Linux \
             servers. It **encrypts data** and demands a ransom in Monero.\n\
             \n\
             > Patch your SSH daemons and rotate keys.",
            Category::Security,
            "Dmitry Ivanov",
            date(2024, 5, 19),
            "https://picsum.photos/seed/security/800/400",
            890,
            &["linux", "ransomware"],
        ),
    ];
    articles[1].is_hot = true;
    articles
}

/// Podcast episodes shown alongside the news feed
pub fn podcasts() -> Vec<Podcast> {
    vec![
        Podcast {
            id: "p1".to_string(),
            title: "The state of AI tooling".to_string(),
            host: "Alexey Petrov".to_string(),
            duration: "45:12".to_string(),
            image_url: "https://picsum.photos/seed/pod1/400/400".to_string(),
            date: date(2024, 5, 17),
        },
        Podcast {
            id: "p2".to_string(),
            title: "Frontend in 2024".to_string(),
            host: "Marina Sokolova".to_string(),
            duration: "38:40".to_string(),
            image_url: "https://picsum.photos/seed/pod2/400/400".to_string(),
            date: date(2024, 5, 10),
        },
        Podcast {
            id: "p3".to_string(),
            title: "Hardening your servers".to_string(),
            host: "Dmitry Ivanov".to_string(),
            duration: "52:05".to_string(),
            image_url: "https://picsum.photos/seed/pod3/400/400".to_string(),
            date: date(2024, 5, 3),
        },
    ]
}
