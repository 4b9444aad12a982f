//! Catalog persistence
//!
//! The whole in-memory collection is the unit of durable state: every save
//! replaces the store file in full. Single active writer assumed.

pub mod codec;

use std::fs;
use std::path::PathBuf;

use crate::{error::AppResult, models::media::MediaItem};

/// Line-oriented catalog store
pub struct MediaStore {
    path: PathBuf,
}

impl MediaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every decodable record; a missing file is an empty catalog
    pub fn load(&self) -> AppResult<Vec<MediaItem>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "store file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        let mut skipped = 0usize;
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match codec::decode_line(line) {
                Some(item) => items.push(item),
                None => {
                    skipped += 1;
                    tracing::warn!(line, "skipping malformed store record");
                }
            }
        }

        tracing::debug!(count = items.len(), skipped, "loaded catalog store");
        Ok(items)
    }

    /// Rewrite the store with the given working set, replacing the file
    pub fn save(&self, items: &[MediaItem]) -> AppResult<()> {
        let mut out = String::new();
        for item in items {
            out.push_str(&codec::encode_line(item));
            out.push('\n');
        }
        fs::write(&self.path, out)?;

        tracing::debug!(count = items.len(), "catalog store rewritten");
        Ok(())
    }
}
