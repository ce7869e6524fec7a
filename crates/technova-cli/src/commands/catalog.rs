//! Category and podcast listings

use anyhow::Result;

use technova_core::{podcasts as podcast_episodes, Category, JsonPersistence, Portal};

use crate::output::Output;

/// List every category with the number of articles in it
pub fn categories(portal: &Portal<JsonPersistence>, output: &Output) -> Result<()> {
    let counts = category_counts(portal);
    output.print_categories(&counts);
    Ok(())
}

/// List the podcast episodes
pub fn podcasts(output: &Output) -> Result<()> {
    output.print_podcasts(&podcast_episodes());
    Ok(())
}

fn category_counts(portal: &Portal<JsonPersistence>) -> Vec<(Category, usize)> {
    Category::ALL
        .iter()
        .map(|&category| {
            let count = portal
                .articles()
                .iter()
                .filter(|a| a.category == category)
                .count();
            (category, count)
        })
        .collect()
}
