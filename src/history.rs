//! Recently used contexts
//!
//! Kept in memory while a session runs and written back when it closes.

use crate::error::{Error, Result};
use crate::types::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of contexts remembered
pub const MAX_RECENT: usize = 10;

/// Most-recent-first list of contexts, optionally backed by a JSON file
#[derive(Debug, Clone, Default)]
pub struct RecentContexts {
    path: Option<PathBuf>,
    entries: Vec<Context>,
}

impl RecentContexts {
    /// In-memory history that is never saved
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load history from `path`
    ///
    /// A missing or unreadable file starts an empty history; it is
    /// rewritten on the next save.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring unreadable history {}: {e}", path.display());
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        debug!("Loaded {} recent contexts", entries.len());
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Move `context` to the front
    pub fn push(&mut self, context: Context) {
        self.entries.retain(|c| c != &context);
        self.entries.insert(0, context);
        self.entries.truncate(MAX_RECENT);
    }

    /// Contexts, most recent first
    pub fn entries(&self) -> &[Context] {
        &self.entries
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the history to its file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| Error::Filesystem {
                op: "create directory",
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, text).map_err(|source| Error::Filesystem {
            op: "write history",
            path: path.clone(),
            source,
        })?;
        debug!("Saved {} recent contexts to {}", self.entries.len(), path.display());
        Ok(())
    }
}
