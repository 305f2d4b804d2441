//! Reading documents and candidate lists from disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use innsight_core::{Candidate, RawDocument};

/// Load one document.
///
/// A `.json` file is a serialised [`RawDocument`] (with optional HTML
/// fragments); anything else is plain text whose source URL defaults to a
/// `file://` URL and whose fetch time is the file's modification time.
pub fn read_document(path: &Path, url: Option<&str>) -> anyhow::Result<RawDocument> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        return serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing document {}", path.display()));
    }

    let fetched_at: DateTime<Utc> = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::from)
        .unwrap_or_else(|_| Utc::now());
    let url = match url {
        Some(url) => url.to_string(),
        None => {
            let abs = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            format!("file://{}", abs.display())
        }
    };
    Ok(RawDocument::from_bytes(url, fetched_at, bytes))
}

/// Regular files directly under `dir`, sorted by name.
pub fn list_documents(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse a JSON array of candidates. Field names outside the schema fail
/// the whole file.
pub fn read_candidates(path: &Path) -> anyhow::Result<Vec<Candidate>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid candidates in {}", path.display()))
}
