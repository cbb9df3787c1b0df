//! Discovery of authored Markdown files under the content root.

use std::path::{Path, PathBuf};

use docsite_config::ContentSettings;
use tracing::warn;
use walkdir::WalkDir;

/// A Markdown file discovered under the content root, before any processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDoc {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub slug: Vec<String>,
}

impl RawDoc {
    /// Slug segments joined with `/`, the canonical document key.
    pub fn slug_key(&self) -> String {
        self.slug.join("/")
    }
}

/// Recursively scan the content root for Markdown documents. A missing root
/// or unreadable entries degrade to an empty or partial listing.
pub fn discover(content: &ContentSettings) -> Vec<RawDoc> {
    let root = &content.root;
    if !root.is_dir() {
        warn!(root = %root.display(), "content root missing; listing is empty");
        return Vec::new();
    }

    let mut docs = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_hidden_entry(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        // the root-level index file is reserved for the landing page
        if relative == Path::new("index.md") {
            continue;
        }
        if content.exclude.is_match(relative) {
            continue;
        }
        let Some(slug) = slug_for(relative) else {
            continue;
        };
        docs.push(RawDoc {
            absolute_path: path.to_path_buf(),
            relative_path: relative.to_path_buf(),
            slug,
        });
    }
    docs
}

fn is_hidden_entry(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Derive slug segments from a root-relative path: extension stripped, a
/// trailing `index` segment elided, empty segments dropped. Returns `None`
/// when nothing remains.
fn slug_for(relative: &Path) -> Option<Vec<String>> {
    let unix = relative.to_string_lossy().replace('\\', "/");
    let without_ext = unix.strip_suffix(".md").unwrap_or(&unix);
    let without_index = if without_ext == "index" {
        ""
    } else {
        without_ext.strip_suffix("/index").unwrap_or(without_ext)
    };
    let segments: Vec<String> = without_index
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
