//! Status command handler

use anyhow::Result;

use technova_core::{view, JsonPersistence, Portal};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(portal: &Portal<JsonPersistence>, output: &Output) -> Result<()> {
    let stats = portal.snapshots().stats();
    let config = portal.config();
    let articles = portal.articles();
    let comments: usize = articles.iter().map(|a| a.comments.len()).sum();
    let hot = view::hot(articles).count();

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "signed_in": portal.session().map(|u| &u.username),
                "completion": {
                    "model": config.model,
                    "api_key_set": config.has_api_key()
                },
                "storage": {
                    "data_dir": config.data_dir,
                    "articles_exist": stats.articles_exist,
                    "session_exists": stats.session_exists,
                    "articles_size": stats.articles_size,
                    "session_size": stats.session_size,
                    "total_size": stats.total_size()
                },
                "counts": {
                    "articles": articles.len(),
                    "hot": hot,
                    "comments": comments
                }
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", articles.len());
        }
        OutputFormat::Human => {
            println!("TechNova Status");
            println!("===============");
            println!();
            println!("Session:");
            match portal.session() {
                Some(user) => println!("  Signed in as {} <{}>", user.username, user.email),
                None => println!("  Not signed in"),
            }
            println!();
            println!("Text completion:");
            println!("  Model:   {}", config.model);
            println!(
                "  API key: {}",
                if config.has_api_key() {
                    "configured"
                } else {
                    "not set (fallback text is used)"
                }
            );
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!(
                "  Articles: {}",
                if stats.articles_exist {
                    "saved"
                } else {
                    "built-in defaults"
                }
            );
            println!("  Size:     {}", stats.total_size_human());
            println!();
            println!("Contents:");
            println!("  Articles: {} ({} hot)", articles.len(), hot);
            println!("  Comments: {}", comments);
        }
    }

    Ok(())
}
