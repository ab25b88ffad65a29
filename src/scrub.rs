//! One-off removal of boilerplate text from article bodies.
//!
//! `articles scrub <file>` loads a JSON array of article objects, deletes
//! every occurrence of a substring from each object's `content` when that
//! field is a string, and rewrites the file in the same format the file
//! backend uses. Objects whose `content` is missing or not a string, and
//! all other fields, are left as they are. Key order is preserved.
//!
//! Running the command twice with the same substring leaves the file as the
//! first run did.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::jsonfile::{self, TextEncoding};

/// The BBC "The Essential List" newsletter footer appended to scraped
/// travel stories. Removed when `--text` is not given.
pub const NEWSLETTER_SIGNATURE: &str = "\n--\nIf you liked this story,sign up for The Essential List newsletter\u{2013} a handpicked selection of features, videos and can't-miss news, delivered to your inbox twice a week.\nFor more Travel stories from the BBC, follow us onFacebook,XandInstagram.\n";

#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("File not found at '{}'", .0.display())]
    Missing(PathBuf),

    #[error("Error decoding JSON from '{}': {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected a JSON array of articles in '{}'", .0.display())]
    NotAnArray(PathBuf),

    #[error("An unexpected error occurred with '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a successful scrub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubReport {
    pub encoding: TextEncoding,
    pub items: usize,
    pub modified: usize,
}

/// Remove `needle` from the string `content` of every object in `items`.
/// Returns how many objects changed.
pub fn scrub_items(items: &mut [Value], needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut modified = 0;
    for item in items.iter_mut() {
        if let Some(Value::String(content)) = item.get_mut("content") {
            if content.contains(needle) {
                *content = content.replace(needle, "");
                modified += 1;
            }
        }
    }
    modified
}

/// Scrub `needle` out of the file at `path` and rewrite it. The file is left
/// untouched when nothing matched and it was already UTF-8.
pub async fn scrub_file(path: &Path, needle: &str) -> Result<ScrubReport, ScrubError> {
    let io_err = |source: std::io::Error| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ScrubError::Missing(path.to_path_buf())
        } else {
            ScrubError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let (text, encoding) = jsonfile::read_text(path).await.map_err(io_err)?;
    if encoding == TextEncoding::Latin1 {
        tracing::warn!(path = %path.display(), "file is not valid UTF-8, retrying as Latin-1");
    }

    let data: Value = serde_json::from_str(&text).map_err(|source| ScrubError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Array(mut items) = data else {
        return Err(ScrubError::NotAnArray(path.to_path_buf()));
    };

    let modified = scrub_items(&mut items, needle);
    let report = ScrubReport {
        encoding,
        items: items.len(),
        modified,
    };
    if modified == 0 && encoding == TextEncoding::Utf8 {
        return Ok(report);
    }

    let bytes = jsonfile::to_pretty_json(&items).map_err(|source| ScrubError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    jsonfile::write_atomic(path, &bytes).await.map_err(io_err)?;

    Ok(report)
}

/// CLI entry point. Prints a diagnostic for each failure class and exits
/// non-zero instead of returning the error.
pub async fn run_scrub(path: &Path, needle: &str) {
    match scrub_file(path, needle).await {
        Ok(report) => {
            if report.encoding == TextEncoding::Latin1 {
                println!(
                    "Decoded '{}' as {} (not valid UTF-8); rewritten as UTF-8.",
                    path.display(),
                    report.encoding.as_str()
                );
            }
            println!(
                "Successfully removed the specified text from the 'content' field in '{}' ({} of {} articles changed).",
                path.display(),
                report.modified,
                report.items
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_scrub_items_only_touches_string_content() {
        let mut items = vec![
            json!({"title": "a SIG", "content": "body SIG tail SIG"}),
            json!({"title": "b", "content": 42}),
            json!({"title": "c"}),
            json!({"title": "d", "content": "clean"}),
        ];
        let modified = scrub_items(&mut items, "SIG");
        assert_eq!(modified, 1);
        assert_eq!(items[0]["content"], "body  tail ");
        assert_eq!(items[0]["title"], "a SIG");
        assert_eq!(items[1]["content"], 42);
        assert!(items[2].get("content").is_none());
        assert_eq!(items[3]["content"], "clean");
    }

    #[test]
    fn test_empty_needle_is_noop() {
        let mut items = vec![json!({"content": "abc"})];
        assert_eq!(scrub_items(&mut items, ""), 0);
        assert_eq!(items[0]["content"], "abc");
    }

    #[tokio::test]
    async fn test_scrub_file_removes_signature_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("articles.json");
        let data = json!([
            {"title": "Trip", "content": format!("Lovely views.{}", NEWSLETTER_SIGNATURE), "extra": true},
            {"title": "Café", "content": "No footer here"},
        ]);
        std::fs::write(&path, serde_json::to_vec(&data).unwrap()).unwrap();

        let report = scrub_file(&path, NEWSLETTER_SIGNATURE).await.unwrap();
        assert_eq!(report.items, 2);
        assert_eq!(report.modified, 1);
        let once = std::fs::read_to_string(&path).unwrap();
        assert!(once.contains("\"content\": \"Lovely views.\""));
        assert!(once.contains("Café"));
        // Key order survives the rewrite
        assert!(once.find("\"content\"").unwrap() < once.find("\"extra\"").unwrap());

        let report = scrub_file(&path, NEWSLETTER_SIGNATURE).await.unwrap();
        assert_eq!(report.modified, 0);
        let twice = std::fs::read_to_string(&path).unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_unchanged_utf8_file_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("articles.json");
        // Compact formatting would be replaced by the pretty printer on a rewrite
        let original = r#"[{"title":"Trip","content":"no footer"}]"#;
        std::fs::write(&path, original).unwrap();

        let report = scrub_file(&path, NEWSLETTER_SIGNATURE).await.unwrap();
        assert_eq!(report.modified, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_failure_classes_are_distinct() {
        let tmp = TempDir::new().unwrap();

        let missing = scrub_file(&tmp.path().join("none.json"), "x").await;
        assert!(matches!(missing, Err(ScrubError::Missing(_))));

        let bad = tmp.path().join("bad.json");
        std::fs::write(&bad, "[{").unwrap();
        assert!(matches!(
            scrub_file(&bad, "x").await,
            Err(ScrubError::Malformed { .. })
        ));

        let obj = tmp.path().join("obj.json");
        std::fs::write(&obj, r#"{"content": "x"}"#).unwrap();
        assert!(matches!(
            scrub_file(&obj, "x").await,
            Err(ScrubError::NotAnArray(_))
        ));
    }

    #[tokio::test]
    async fn test_latin1_input_rewritten_as_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latin1.json");
        let text = r#"[{"title": "Café", "content": "déjà vu END"}]"#;
        let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
        std::fs::write(&path, bytes).unwrap();

        let report = scrub_file(&path, " END").await.unwrap();
        assert_eq!(report.encoding, TextEncoding::Latin1);
        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.contains("\"content\": \"déjà vu\""));
    }
}
