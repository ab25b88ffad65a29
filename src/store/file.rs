//! JSON-file-backed [`ArticleStore`] implementation.
//!
//! The whole collection is loaded into memory when the store is opened.
//! Every mutation rewrites the entire file, so each write is O(n) in the
//! number of articles; this backend is meant for small data sets.
//!
//! Identity is positional: an article's id is its index in the array.
//! Deleting an article shifts every later article down by one.
//!
//! Each record is kept as the JSON object it was read as, so keys other than
//! `title` and `content` (a scraped `url` or `date`, say) and the key order
//! survive every rewrite. Opening a file whose records lack a string `title`
//! or `content` is an error.
//!
//! Mutations hold the write half of a [`RwLock`] across the
//! read-modify-write and the file rewrite, so concurrent writers are
//! serialized and no update is lost. The in-memory collection is only
//! replaced after the file write succeeds.

use async_trait::async_trait;
use serde::de::Error as _;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::{title_matches, ArticleStore};
use crate::error::{StoreError, StoreResult};
use crate::jsonfile;
use crate::models::{Article, ArticleInput};

/// One article as stored in the file, including any extra keys.
type Record = Map<String, Value>;

pub struct FileStore {
    path: PathBuf,
    articles: RwLock<Vec<Record>>,
}

impl FileStore {
    /// Load the data file at `path`. A missing file yields an empty store;
    /// the file is created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let articles = match jsonfile::read_text(&path).await {
            Ok((text, encoding)) => {
                if encoding != jsonfile::TextEncoding::Utf8 {
                    tracing::warn!(
                        path = %path.display(),
                        "data file is not valid UTF-8, decoded as {}",
                        encoding.as_str()
                    );
                }
                parse_records(&text)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "data file not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), count = articles.len(), "loaded data file");

        Ok(Self {
            path,
            articles: RwLock::new(articles),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, articles: &[Record]) -> StoreResult<()> {
        let bytes = jsonfile::to_pretty_json(articles)?;
        jsonfile::write_atomic(&self.path, &bytes).await?;
        Ok(())
    }
}

fn index_of(id: i64, len: usize) -> StoreResult<usize> {
    usize::try_from(id)
        .ok()
        .filter(|&i| i < len)
        .ok_or(StoreError::NotFound)
}

fn parse_records(text: &str) -> serde_json::Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_str(text)?;
    for (i, record) in records.iter().enumerate() {
        for key in ["title", "content"] {
            if !matches!(record.get(key), Some(Value::String(_))) {
                return Err(serde_json::Error::custom(format!(
                    "article {} has no string `{}`",
                    i, key
                )));
            }
        }
    }
    Ok(records)
}

fn text_field<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn to_record(input: &ArticleInput) -> Record {
    let mut record = Record::new();
    set_fields(&mut record, input);
    record
}

/// Overwrite `title` and `content` in place, leaving other keys alone.
fn set_fields(record: &mut Record, input: &ArticleInput) {
    record.insert("title".to_string(), Value::String(input.title.clone()));
    record.insert("content".to_string(), Value::String(input.content.clone()));
}

fn to_article(index: usize, record: &Record) -> Article {
    Article {
        id: index as i64,
        title: text_field(record, "title").to_string(),
        content: text_field(record, "content").to_string(),
    }
}

#[async_trait]
impl ArticleStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn list(&self) -> StoreResult<Vec<Article>> {
        let articles = self.articles.read().await;
        Ok(articles
            .iter()
            .enumerate()
            .map(|(i, a)| to_article(i, a))
            .collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Article> {
        let articles = self.articles.read().await;
        let index = index_of(id, articles.len())?;
        Ok(to_article(index, &articles[index]))
    }

    async fn insert(&self, article: &ArticleInput) -> StoreResult<Article> {
        let mut articles = self.articles.write().await;
        let mut next = articles.clone();
        next.push(to_record(article));
        self.persist(&next).await?;
        *articles = next;
        Ok(article.clone().with_id((articles.len() - 1) as i64))
    }

    async fn insert_many(&self, batch: &[ArticleInput]) -> StoreResult<usize> {
        let mut articles = self.articles.write().await;
        let mut next = articles.clone();
        next.extend(batch.iter().map(to_record));
        self.persist(&next).await?;
        *articles = next;
        Ok(batch.len())
    }

    async fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Article>> {
        let needle = fragment.to_lowercase();
        let articles = self.articles.read().await;
        let matches: Vec<Article> = articles
            .iter()
            .enumerate()
            .filter(|(_, a)| title_matches(text_field(a, "title"), &needle))
            .map(|(i, a)| to_article(i, a))
            .collect();

        if matches.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(matches)
    }

    async fn update(&self, id: i64, article: &ArticleInput) -> StoreResult<()> {
        let mut articles = self.articles.write().await;
        let index = index_of(id, articles.len())?;
        let mut next = articles.clone();
        set_fields(&mut next[index], article);
        self.persist(&next).await?;
        *articles = next;
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut articles = self.articles.write().await;
        let index = index_of(id, articles.len())?;
        let mut next = articles.clone();
        next.remove(index);
        self.persist(&next).await?;
        *articles = next;
        Ok(())
    }
}
