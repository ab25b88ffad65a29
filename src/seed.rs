//! Bulk loading of articles from a JSON seed file.
//!
//! The seed file is a JSON array of `{title, content}` objects. It is read
//! whole, decoded as UTF-8 with a Latin-1 fallback, and handed to the
//! store's [`insert_many`](crate::store::ArticleStore::insert_many) in file
//! order. A missing file, a malformed document, and a storage failure are
//! reported as different [`SeedError`] variants so the HTTP layer can map
//! them to 404 and 500 respectively.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::StoreError;
use crate::jsonfile::{self, TextEncoding};
use crate::models::ArticleInput;
use crate::store::ArticleStore;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("malformed seed file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read seed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read and parse a seed file without touching any store.
pub async fn read_seed_file(path: &Path) -> Result<Vec<ArticleInput>, SeedError> {
    let (text, encoding) = jsonfile::read_text(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SeedError::Missing(path.to_path_buf())
        } else {
            SeedError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if encoding == TextEncoding::Latin1 {
        tracing::warn!(
            path = %path.display(),
            "seed file is not valid UTF-8, retried as Latin-1"
        );
    }

    serde_json::from_str(&text).map_err(|e| SeedError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load every record of the seed file into `store`. Returns the number of
/// records inserted.
pub async fn load_seed_file(store: &dyn ArticleStore, path: &Path) -> Result<usize, SeedError> {
    let articles = read_seed_file(path).await?;
    let inserted = store.insert_many(&articles).await?;
    tracing::info!(
        path = %path.display(),
        inserted,
        backend = store.backend_name(),
        "bulk load complete"
    );
    Ok(inserted)
}
