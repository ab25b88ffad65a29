//! SQLite-backed [`ArticleStore`] implementation.
//!
//! Holds no article state of its own. Each operation checks a connection
//! out of the pool, runs one parameterized statement, and returns the
//! connection when the query future completes or is dropped. The bulk
//! insert runs inside a single transaction instead, which is rolled back if
//! any row fails.
//!
//! SQLite's `LOWER()` and `LIKE` only fold ASCII case, so title search
//! filters rows in Rust with the same rule as the file backend.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{title_matches, ArticleStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{Article, ArticleInput};

/// SQLite implementation of the [`ArticleStore`] trait.
///
/// Owns the connection pool; [`close`](ArticleStore::close) drains it.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_article(row: &SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "database"
    }

    async fn list(&self) -> StoreResult<Vec<Article>> {
        let rows = sqlx::query("SELECT id, title, content FROM articles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Article> {
        let row = sqlx::query("SELECT id, title, content FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_article).ok_or(StoreError::NotFound)
    }

    async fn insert(&self, article: &ArticleInput) -> StoreResult<Article> {
        let result = sqlx::query("INSERT INTO articles (title, content) VALUES (?, ?)")
            .bind(&article.title)
            .bind(&article.content)
            .execute(&self.pool)
            .await?;
        Ok(article.clone().with_id(result.last_insert_rowid()))
    }

    async fn insert_many(&self, articles: &[ArticleInput]) -> StoreResult<usize> {
        // Dropping `tx` without commit rolls back
        let mut tx = self.pool.begin().await?;
        for article in articles {
            sqlx::query("INSERT INTO articles (title, content) VALUES (?, ?)")
                .bind(&article.title)
                .bind(&article.content)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(articles.len())
    }

    async fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Article>> {
        let needle = fragment.to_lowercase();
        let rows = sqlx::query("SELECT id, title, content FROM articles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let matches: Vec<Article> = rows
            .iter()
            .filter(|row| title_matches(row.get::<&str, _>("title"), &needle))
            .map(row_to_article)
            .collect();

        if matches.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(matches)
    }

    async fn update(&self, id: i64, article: &ArticleInput) -> StoreResult<()> {
        let result = sqlx::query("UPDATE articles SET title = ?, content = ? WHERE id = ?")
            .bind(&article.title)
            .bind(&article.content)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
