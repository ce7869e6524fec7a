//! TechNova CLI
//!
//! Command-line interface for TechNova - a local-first IT news portal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use technova_core::{CategoryFilter, CompletionMode, Config, JsonPersistence, Portal};

mod commands;
mod editor;
mod output;
mod tui;

use commands::article::PublishArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "technova")]
#[command(about = "TechNova - Local-first IT news portal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List articles
    #[command(alias = "ls")]
    List {
        /// Only this category (AI, Web, Mobile, Security, Hardware, Gaming, Career or all)
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
        /// Case-insensitive text search in title and body
        #[arg(short, long)]
        search: Option<String>,
        /// Order by views + 3 x likes instead of date
        #[arg(short, long)]
        trending: bool,
        /// Only featured articles
        #[arg(long)]
        hot: bool,
    },
    /// Read an article (counts as a view)
    Show {
        /// Article ID (full or prefix)
        id: String,
        /// Print the body as HTML
        #[arg(long)]
        html: bool,
    },
    /// Publish a new article (requires sign-in)
    Publish(PublishArgs),
    /// Like or unlike an article (requires sign-in)
    Like {
        /// Article ID (full or prefix)
        id: String,
    },
    /// Manage comments on an article
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Sign in (any credentials are accepted)
    Login {
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Display name
        #[arg(short, long)]
        username: Option<String>,
        /// Create a new account instead of signing in
        #[arg(long)]
        register: bool,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List categories
    Categories,
    /// List podcast episodes
    Podcasts,
    /// Generate a summary or title for some text
    Suggest {
        #[command(subcommand)]
        command: SuggestCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (storage, session, counts)
    Status,
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Comment on an article
    #[command(alias = "create")]
    Add {
        /// Article ID (full or prefix)
        article_id: String,
        /// Comment text
        text: String,
    },
    /// List comments on an article
    #[command(alias = "ls")]
    List {
        /// Article ID (full or prefix)
        article_id: String,
    },
    /// Like or unlike a comment
    Like {
        /// Article ID (full or prefix)
        article_id: String,
        /// Comment ID (full or prefix)
        comment_id: String,
    },
}

#[derive(Subcommand)]
enum SuggestCommands {
    /// Suggest a summary
    Summary(commands::suggest::SuggestArgs),
    /// Suggest a headline
    Title(commands::suggest::SuggestArgs),
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_key, model, completion_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // The TUI owns the terminal and logs to a file instead
    if matches!(&cli.command, Some(Commands::Tui) | None) {
        let config = Config::load_with_cli_override(config_path)
            .context("Failed to load configuration")?;
        return tui::run(config).await;
    }

    init_cli_logging();

    // Commands that don't need the portal
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let mut portal = Portal::open_with_config(config);

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Tui | Commands::Config { .. } => Ok(()), // Handled above
        Commands::List {
            category,
            search,
            trending,
            hot,
        } => commands::article::list(&portal, category, search, trending, hot, &output),
        Commands::Show { id, html } => commands::article::show(&mut portal, &id, html, &output),
        Commands::Publish(args) => commands::article::publish(&mut portal, args, &output).await,
        Commands::Like { id } => commands::article::like(&mut portal, &id, &output),
        Commands::Comment { command } => handle_comment_command(command, &mut portal, &output),
        Commands::Login {
            email,
            password,
            username,
            register,
        } => commands::auth::login(&mut portal, email, password, username, register, &output),
        Commands::Logout => commands::auth::logout(&mut portal, &output),
        Commands::Whoami => commands::auth::whoami(&portal, &output),
        Commands::Categories => commands::catalog::categories(&portal, &output),
        Commands::Podcasts => commands::catalog::podcasts(&output),
        Commands::Suggest { command } => handle_suggest_command(command, &portal, &output).await,
        Commands::Status => commands::status::show(&portal, &output),
    }
}

fn handle_comment_command(
    command: CommentCommands,
    portal: &mut Portal<JsonPersistence>,
    output: &Output,
) -> Result<()> {
    match command {
        CommentCommands::Add { article_id, text } => {
            commands::comment::add(portal, &article_id, &text, output)
        }
        CommentCommands::List { article_id } => commands::comment::list(portal, &article_id, output),
        CommentCommands::Like {
            article_id,
            comment_id,
        } => commands::comment::like(portal, &article_id, &comment_id, output),
    }
}

async fn handle_suggest_command(
    command: SuggestCommands,
    portal: &Portal<JsonPersistence>,
    output: &Output,
) -> Result<()> {
    let (mode, args) = match command {
        SuggestCommands::Summary(args) => (CompletionMode::Summary, args),
        SuggestCommands::Title(args) => (CompletionMode::Title, args),
    };
    commands::suggest::suggest(portal.config(), mode, args, output).await
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging for CLI commands
///
/// Logs go to stderr so they never mix with command output. The level comes
/// from TECHNOVA_LOG and defaults to warnings only.
fn init_cli_logging() {
    let env_filter =
        EnvFilter::try_from_env("TECHNOVA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
