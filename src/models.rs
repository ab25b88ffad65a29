//! Core data models used throughout the Articles API.
//!
//! [`Article`] is what the stores hand back and what the HTTP layer
//! serializes. [`ArticleInput`] is the `{title, content}` body accepted by
//! the create and update endpoints, and the element type of the JSON data
//! and seed files.

use serde::{Deserialize, Serialize};

/// A persisted article.
///
/// For the database backend `id` is the surrogate key assigned on insert.
/// For the file backend it is the zero-based position in the array, which
/// shifts when earlier records are deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// The `{title, content}` shape of a request body or a data-file entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
}

impl ArticleInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Attach an identity, producing the stored form of this input.
    pub fn with_id(self, id: i64) -> Article {
        Article {
            id,
            title: self.title,
            content: self.content,
        }
    }
}
