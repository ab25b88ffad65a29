use sqlx::SqlitePool;

use crate::error::StoreResult;

/// Create the `articles` table if it does not already exist.
///
/// Idempotent; safe to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_title ON articles(title)")
        .execute(pool)
        .await?;

    Ok(())
}
