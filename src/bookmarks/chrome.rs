//! Chromium `Bookmarks` JSON file
//!
//! The file holds a `roots` object whose entries (`bookmark_bar`, `other`,
//! `synced`) are folder nodes. Every node has an `id` and a `name`; URL
//! nodes carry a `url`, folder nodes carry `children`. The document is kept
//! as a `serde_json::Value` so unknown fields survive a rewrite.

use crate::bookmarks::{join_folder, BookmarkError, BookmarkResult, BookmarkSource, BookmarkStore};
use crate::scanner::Target;
use serde_json::Value;
use std::path::PathBuf;

/// Order in which Chromium presents its root folders
const ROOT_ORDER: [&str; 3] = ["bookmark_bar", "other", "synced"];

/// Bookmarks stored in a Chromium profile
#[derive(Debug, Clone)]
pub struct ChromeBookmarks {
    path: PathBuf,
}

impl ChromeBookmarks {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> BookmarkResult<Value> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the document next to the original and renames it into place
    fn write_document(&self, document: &Value) -> BookmarkResult<()> {
        let tmp = self.path.with_extension("bookmark-audit.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(document)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl BookmarkSource for ChromeBookmarks {
    fn load(&self) -> BookmarkResult<Vec<Target>> {
        let document = self.read_document()?;
        let mut targets = Vec::new();

        for root in ordered_roots(&document)? {
            collect(root, "", &mut targets);
        }

        tracing::debug!(
            "Loaded {} bookmarks from {}",
            targets.len(),
            self.path.display()
        );
        Ok(targets)
    }
}

impl BookmarkStore for ChromeBookmarks {
    fn remove(&mut self, id: &str) -> BookmarkResult<()> {
        let mut document = self.read_document()?;

        let roots = document
            .get_mut("roots")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| BookmarkError::Malformed("missing 'roots' object".to_string()))?;

        let mut removed = None;
        for root in roots.values_mut() {
            if node_id(root) == Some(id) {
                return Err(BookmarkError::NotABookmark(id.to_string()));
            }
            removed = remove_node(root, id)?;
            if removed.is_some() {
                break;
            }
        }

        if removed.is_none() {
            return Err(BookmarkError::NotFound(id.to_string()));
        }

        // Chromium rejects a file whose checksum no longer matches; without one it recomputes
        if let Some(object) = document.as_object_mut() {
            object.remove("checksum");
        }

        self.write_document(&document)
    }
}

/// Returns the root folders, known roots first
fn ordered_roots(document: &Value) -> BookmarkResult<Vec<&Value>> {
    let roots = document
        .get("roots")
        .and_then(Value::as_object)
        .ok_or_else(|| BookmarkError::Malformed("missing 'roots' object".to_string()))?;

    let mut ordered: Vec<&Value> = ROOT_ORDER.iter().filter_map(|key| roots.get(*key)).collect();
    ordered.extend(
        roots
            .iter()
            .filter(|(key, _)| !ROOT_ORDER.contains(&key.as_str()))
            .map(|(_, value)| value)
            .filter(|value| value.is_object()),
    );
    Ok(ordered)
}

fn node_id(node: &Value) -> Option<&str> {
    node.get("id").and_then(Value::as_str)
}

fn node_name(node: &Value) -> &str {
    node.get("name").and_then(Value::as_str).unwrap_or("")
}

/// Appends the bookmarks under `node` to `out`, depth-first
fn collect(node: &Value, parent: &str, out: &mut Vec<Target>) {
    if let Some(url) = node.get("url").and_then(Value::as_str) {
        out.push(Target::new(
            node_id(node).unwrap_or_default(),
            node_name(node),
            url,
            parent,
        ));
        return;
    }

    if let Some(children) = node.get("children").and_then(Value::as_array) {
        let folder = join_folder(parent, node_name(node));
        for child in children {
            collect(child, &folder, out);
        }
    }
}

/// Removes the URL node with `id` from the subtree under `node`
///
/// Returns the removed node, None if the id is not in this subtree, or
/// `NotABookmark` if the id names a folder.
fn remove_node(node: &mut Value, id: &str) -> BookmarkResult<Option<Value>> {
    let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) else {
        return Ok(None);
    };

    if let Some(index) = children.iter().position(|child| node_id(child) == Some(id)) {
        if children[index].get("url").is_none() {
            return Err(BookmarkError::NotABookmark(id.to_string()));
        }
        return Ok(Some(children.remove(index)));
    }

    for child in children.iter_mut() {
        if let Some(removed) = remove_node(child, id)? {
            return Ok(Some(removed));
        }
    }

    Ok(None)
}
