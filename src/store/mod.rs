//! Storage abstraction for articles.
//!
//! The [`ArticleStore`] trait is the only thing the HTTP layer and the bulk
//! loader know about storage. Two implementations exist:
//!
//! | Backend | Type | Identity |
//! |---------|------|----------|
//! | JSON file | [`file::FileStore`] | array position |
//! | SQLite pool | [`sqlite::SqliteStore`] | `INTEGER PRIMARY KEY` |
//!
//! Implementations must be `Send + Sync`; the server shares one instance
//! across all request tasks behind an `Arc`.

pub mod file;
pub mod sqlite;

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::error::StoreResult;
use crate::{db, migrate};
use crate::models::{Article, ArticleInput};

/// Abstract article storage backend.
///
/// Every lookup keyed by id, and [`search_by_title`](ArticleStore::search_by_title),
/// reports a miss as [`StoreError::NotFound`](crate::error::StoreError::NotFound),
/// never as an empty success.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Short backend name for logs and `/health`.
    fn backend_name(&self) -> &'static str;

    /// All articles. Ordering is backend-defined.
    async fn list(&self) -> StoreResult<Vec<Article>>;

    async fn get(&self, id: i64) -> StoreResult<Article>;

    /// Store one article and return it with its assigned id.
    async fn insert(&self, article: &ArticleInput) -> StoreResult<Article>;

    /// Store a batch of articles atomically: either all are persisted or
    /// none are. Returns the number inserted.
    async fn insert_many(&self, articles: &[ArticleInput]) -> StoreResult<usize>;

    /// Case-insensitive substring match on `title`.
    async fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Article>>;

    async fn update(&self, id: i64, article: &ArticleInput) -> StoreResult<()>;

    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) {}
}

/// Title-search rule shared by every backend: Unicode lowercase on both
/// sides, then a plain substring test. `needle` must already be lowercased.
pub(crate) fn title_matches(title: &str, needle: &str) -> bool {
    title.to_lowercase().contains(needle)
}

/// Open the backend selected by `[store].backend`.
///
/// For the database backend this builds the connection pool from
/// `DATABASE_URL` and creates the `articles` table if needed.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn ArticleStore>> {
    match config.store.backend {
        Backend::File => {
            let store = file::FileStore::open(&config.store.data_file)
                .await
                .with_context(|| {
                    format!(
                        "Failed to load data file: {}",
                        config.store.data_file.display()
                    )
                })?;
            Ok(Arc::new(store))
        }
        Backend::Database => {
            let pool = db::connect(config).await?;
            migrate::run_migrations(&pool)
                .await
                .with_context(|| "Failed to create articles table")?;
            Ok(Arc::new(sqlite::SqliteStore::new(pool)))
        }
    }
}
