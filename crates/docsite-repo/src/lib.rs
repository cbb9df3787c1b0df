//! Document repository and preprocessor for the docsite content pipeline.
//!
//! The repository walks a directory of authored Markdown, applies the fixed
//! transform chain in [`preprocess`] to each body, and produces normalized
//! Markdown plus title/section metadata. Every query re-reads disk: the
//! corpus is small and changes rarely, so no cache is kept and concurrent
//! callers are trivially safe. Nothing here is fatal; a missing root,
//! unreadable file, or unknown slug degrades to an empty listing or an
//! absent document.

mod frontmatter;
mod order;
mod preprocess;
mod scan;
mod version;

pub use frontmatter::split_front_matter;
pub use preprocess::{extract_title, fallback_title, normalize};
pub use scan::RawDoc;
pub use version::{latest_version, LatestVersion};

use std::fs;

use docsite_config::Config;
use serde::Serialize;
use tracing::warn;

/// Summary used to build navigation listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocMeta {
    pub slug: Vec<String>,
    pub title: String,
    /// First slug segment; navigation groups are fixed at the top-level
    /// directory.
    pub section: String,
}

/// A fetched document after preprocessing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocData {
    pub title: String,
    pub content: String,
}

/// Read-through view over the content root.
pub struct Repository {
    config: Config,
}

impl Repository {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List all navigable documents in locale-aware slug order. Hidden slugs
    /// never appear here.
    pub fn list_documents(&self) -> Vec<DocMeta> {
        let mut metas: Vec<DocMeta> = scan::discover(&self.config.content)
            .into_iter()
            .filter(|doc| !self.config.content.hidden.contains(&doc.slug_key()))
            .filter_map(|doc| {
                let content = self.normalized_content(&doc)?;
                let title = preprocess::extract_title(&content)
                    .unwrap_or_else(|| preprocess::fallback_title(&doc.slug));
                let section = doc.slug[0].clone();
                Some(DocMeta {
                    slug: doc.slug,
                    title,
                    section,
                })
            })
            .collect();
        metas.sort_by(|a, b| order::compare_slugs(&a.slug.join("/"), &b.slug.join("/")));
        metas
    }

    /// Fetch one document by slug. Hidden slugs, empty slugs, and missing
    /// files are all reported as absent.
    pub fn get_document(&self, slug: &[String]) -> Option<DocData> {
        let key = slug.join("/");
        if key.is_empty() || self.config.content.hidden.contains(&key) {
            return None;
        }
        let doc = scan::discover(&self.config.content)
            .into_iter()
            .find(|doc| doc.slug_key() == key)?;
        let content = self.normalized_content(&doc)?;
        let title = preprocess::extract_title(&content)
            .unwrap_or_else(|| preprocess::fallback_title(&doc.slug));
        Some(DocData { title, content })
    }

    /// Latest release summary from the configured feed.
    pub fn latest_version(&self) -> LatestVersion {
        version::latest_version(&self.config.version)
    }

    fn normalized_content(&self, doc: &RawDoc) -> Option<String> {
        let source = match fs::read_to_string(&doc.absolute_path) {
            Ok(source) => source,
            Err(err) => {
                warn!(path = %doc.absolute_path.display(), error = %err, "skipping unreadable document");
                return None;
            }
        };
        let (_matter, body) = frontmatter::split_front_matter(&source);

        // the catalog document bypasses the transform chain entirely
        if doc.relative_path == self.config.content.catalog_file {
            return Some(docsite_catalog::render_catalog_markdown(body));
        }
        Some(preprocess::normalize(body, &self.config.routes))
    }
}
