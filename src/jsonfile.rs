//! Reading and writing the JSON article files.
//!
//! Shared by the file backend, the bulk loader, and the scrub command.
//!
//! - **Decoding**: bytes are decoded as UTF-8; if that fails they are
//!   decoded once more as Latin-1 (ISO-8859-1), which maps every byte to the
//!   code point of the same value and therefore cannot fail.
//! - **Encoding**: output is always UTF-8, pretty-printed with a 4-space
//!   indent, with non-ASCII characters written literally.
//! - **Writes** go to a sibling temporary file that is renamed over the
//!   target, so a crash mid-write leaves the previous file intact.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Which decoding produced the text of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Latin1 => "Latin-1",
        }
    }
}

/// Decode file bytes, falling back to Latin-1 when they are not UTF-8.
pub fn decode_text(bytes: Vec<u8>) -> (String, TextEncoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, TextEncoding::Utf8),
        Err(e) => {
            let bytes = e.into_bytes();
            let text: String = bytes.iter().map(|&b| char::from(b)).collect();
            (text, TextEncoding::Latin1)
        }
    }
}

/// Read a file and decode it with [`decode_text`].
pub async fn read_text(path: &Path) -> io::Result<(String, TextEncoding)> {
    let bytes = tokio::fs::read(path).await?;
    Ok(decode_text(bytes))
}

/// Serialize `value` as 4-space pretty JSON with a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Replace the contents of `path` with `bytes` via temp file + rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
