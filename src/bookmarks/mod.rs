//! Bookmark sources and stores
//!
//! This module turns browser bookmark files into flat lists of scan targets
//! and removes bookmarks again once a user decides they are dead:
//! - `ChromeBookmarks`: the Chromium `Bookmarks` JSON file (read/write)
//! - `NetscapeBookmarks`: the `bookmarks.html` export format (read-only)

mod chrome;
mod netscape;

pub use chrome::ChromeBookmarks;
pub use netscape::NetscapeBookmarks;

use crate::config::{BookmarkFormat, BookmarksConfig};
use crate::scanner::Target;
use std::path::PathBuf;
use thiserror::Error;

/// Separator between folder names in a target's folder path
pub const FOLDER_SEPARATOR: &str = " / ";

/// Errors that can occur while reading or editing bookmarks
#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bookmark JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed bookmark file: {0}")]
    Malformed(String),

    #[error("Bookmark not found: {0}")]
    NotFound(String),

    #[error("Not a bookmark (folder or root): {0}")]
    NotABookmark(String),

    #[error("Bookmark format {0:?} does not support deletion")]
    ReadOnly(BookmarkFormat),
}

/// Result type for bookmark operations
pub type BookmarkResult<T> = Result<T, BookmarkError>;

/// Something that can enumerate bookmarks as scan targets
pub trait BookmarkSource {
    /// Loads every bookmark, depth-first in document order
    fn load(&self) -> BookmarkResult<Vec<Target>>;
}

/// A bookmark source that also supports removal
pub trait BookmarkStore: BookmarkSource {
    /// Removes a single bookmark by id
    fn remove(&mut self, id: &str) -> BookmarkResult<()>;
}

/// Outcome of removing one bookmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    pub id: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Removes bookmarks one by one, never aborting the batch
///
/// Each id gets its own `DeletionResult`; a failure (unknown id, folder id,
/// write error) is recorded and the next id is attempted.
pub fn delete_bookmarks(store: &mut dyn BookmarkStore, ids: &[String]) -> Vec<DeletionResult> {
    ids.iter()
        .map(|id| match store.remove(id) {
            Ok(()) => {
                tracing::info!("Deleted bookmark {}", id);
                DeletionResult {
                    id: id.clone(),
                    succeeded: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to delete bookmark {}: {}", id, e);
                DeletionResult {
                    id: id.clone(),
                    succeeded: false,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

/// Opens the configured bookmark file for reading
pub fn open_source(config: &BookmarksConfig) -> Box<dyn BookmarkSource> {
    let path = PathBuf::from(&config.path);
    match config.format {
        BookmarkFormat::Chrome => Box::new(ChromeBookmarks::new(path)),
        BookmarkFormat::Netscape => Box::new(NetscapeBookmarks::new(path)),
    }
}

/// Opens the configured bookmark file for editing
///
/// # Errors
///
/// * `BookmarkError::ReadOnly` - the format cannot be written back
pub fn open_store(config: &BookmarksConfig) -> BookmarkResult<Box<dyn BookmarkStore>> {
    match config.format {
        BookmarkFormat::Chrome => Ok(Box::new(ChromeBookmarks::new(PathBuf::from(
            &config.path,
        )))),
        format => Err(BookmarkError::ReadOnly(format)),
    }
}

/// Joins a folder path with a child folder name
fn join_folder(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, FOLDER_SEPARATOR, name)
    }
}
