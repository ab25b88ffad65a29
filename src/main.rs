//! # Articles API CLI (`articles`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `articles init` | Create the `articles` table (database backend) |
//! | `articles serve` | Start the HTTP server |
//! | `articles load` | Bulk-load the seed file into the configured backend |
//! | `articles scrub <file>` | Remove boilerplate text from a JSON article file |
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use anyhow::Context;
use articles_api::{config, db, migrate, scrub, seed, server, store};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Articles API: store, search, and serve articles from a JSON file or SQLite.
#[derive(Parser)]
#[command(name = "articles", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// The database URL is read from the `DATABASE_URL` environment
    /// variable, not from this file.
    #[arg(long, global = true, default_value = "./config/articles.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the articles table. Idempotent.
    Init,

    /// Start the HTTP server.
    Serve,

    /// Insert every record of a JSON seed file into the configured backend.
    ///
    /// For the database backend the whole file is inserted in one
    /// transaction.
    Load {
        /// Seed file to load. Defaults to `[store].seed_file`.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Remove a substring from the `content` of every article in a JSON file.
    ///
    /// Does not read the config file.
    Scrub {
        /// JSON file to rewrite in place.
        file: PathBuf,

        /// Exact text to remove. Defaults to the BBC newsletter footer.
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Scrub { file, text } = &cli.command {
        let needle = text.as_deref().unwrap_or(scrub::NEWSLETTER_SIGNATURE);
        scrub::run_scrub(file, needle).await;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool)
                .await
                .with_context(|| "Failed to create articles table")?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Load { file } => {
            let path = file.unwrap_or_else(|| cfg.store.seed_file.clone());
            let store = store::open_store(&cfg).await?;
            let result = seed::load_seed_file(store.as_ref(), &path).await;
            store.close().await;
            let inserted = result?;
            println!("Loaded {} articles from {}", inserted, path.display());
        }
        Commands::Scrub { .. } => unreachable!(),
    }

    Ok(())
}
