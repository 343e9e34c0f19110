//! Netscape bookmark file (`bookmarks.html`)
//!
//! Every browser can export this format. Folders are `<H3>` headings whose
//! contents follow in a sibling `<DL>`; bookmarks are `<A HREF>` anchors.
//! The file carries no stable ids, so anchors are numbered in document order.

use crate::bookmarks::{join_folder, BookmarkResult, BookmarkSource};
use crate::scanner::Target;
use scraper::{ElementRef, Html};
use std::path::PathBuf;

/// Prefix of the synthetic ids given to exported bookmarks
pub const ID_PREFIX: &str = "netscape-";

/// Bookmarks from an HTML export
#[derive(Debug, Clone)]
pub struct NetscapeBookmarks {
    path: PathBuf,
}

impl NetscapeBookmarks {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BookmarkSource for NetscapeBookmarks {
    fn load(&self) -> BookmarkResult<Vec<Target>> {
        let content = std::fs::read_to_string(&self.path)?;
        let targets = parse_bookmarks_html(&content);
        tracing::debug!(
            "Loaded {} bookmarks from {}",
            targets.len(),
            self.path.display()
        );
        Ok(targets)
    }
}

/// Parses a Netscape bookmark document into targets
pub fn parse_bookmarks_html(content: &str) -> Vec<Target> {
    let document = Html::parse_document(content);
    let mut targets = Vec::new();
    walk(document.root_element(), "", &mut targets);
    targets
}

fn walk(element: ElementRef<'_>, folder: &str, out: &mut Vec<Target>) {
    // An <H3> names the next <DL> at the same level
    let mut pending_folder: Option<String> = None;

    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "a" => {
                if let Some(href) = child.value().attr("href") {
                    out.push(Target::new(
                        format!("{}{}", ID_PREFIX, out.len() + 1),
                        collapse_whitespace(&child.text().collect::<String>()),
                        href.trim(),
                        folder,
                    ));
                }
            }
            "h3" => {
                pending_folder = Some(collapse_whitespace(&child.text().collect::<String>()));
            }
            "dl" => match pending_folder.take() {
                Some(name) => walk(child, &join_folder(folder, &name), out),
                None => walk(child, folder, out),
            },
            "h1" | "title" | "head" | "meta" | "style" | "script" => {}
            _ => walk(child, folder, out),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
