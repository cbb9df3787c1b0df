//! Catalog extraction for the DLC document.
//!
//! One authored file carries a script-style array literal describing the DLC
//! catalog: a list of sections, each holding items with up to three download
//! links. This crate locates the literal's span, parses it with the
//! restricted grammar in [`literal`], and exposes the result both as typed
//! sections and as a flattened Markdown rendition used when the dedicated
//! catalog view is unavailable. Every failure path yields an empty catalog;
//! the catalog is supplementary content, never critical path.

mod literal;
mod markdown;

pub use literal::{parse_literal, Literal, LiteralError};
pub use markdown::render_catalog_markdown;

use std::fs;
use std::sync::LazyLock;

use docsite_config::Config;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

/// One catalog section, anchored in the document by its id.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSection {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub items: Vec<CatalogItem>,
}

/// One downloadable entry. An item with zero links is valid and simply
/// renders without action affordances.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netdisk_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_link: Option<String>,
}

static LITERAL_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)const\s+dlcSections\s*=\s*(\[.*?\])\s*</script>")
        .expect("literal span pattern")
});

/// Extract catalog sections from raw document source. Returns an empty list
/// when no literal is present or the literal fails to parse.
pub fn parse_catalog(source: &str) -> Vec<CatalogSection> {
    let Some(captures) = LITERAL_SPAN.captures(source) else {
        debug!("no catalog literal found in source");
        return Vec::new();
    };
    let literal = match parse_literal(&captures[1]) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "catalog literal failed to parse");
            return Vec::new();
        }
    };
    sections_from_literal(&literal)
}

/// Read the configured catalog document and extract its sections. Missing or
/// unreadable files degrade to an empty catalog.
pub fn load_catalog(config: &Config) -> Vec<CatalogSection> {
    let path = config.content.root.join(&config.content.catalog_file);
    match fs::read_to_string(&path) {
        Ok(source) => parse_catalog(&source),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read catalog document");
            Vec::new()
        }
    }
}

fn sections_from_literal(literal: &Literal) -> Vec<CatalogSection> {
    let Literal::Array(entries) = literal else {
        warn!("catalog literal is not an array");
        return Vec::new();
    };
    entries.iter().filter_map(section_from_entry).collect()
}

fn section_from_entry(entry: &Literal) -> Option<CatalogSection> {
    let id = entry.get("id")?.as_str()?.to_owned();
    let title = entry.get("title")?.as_str()?.to_owned();
    let note = string_field(entry, "note");
    let items = match entry.get("items") {
        Some(Literal::Array(items)) => items.iter().filter_map(item_from_entry).collect(),
        _ => Vec::new(),
    };
    Some(CatalogSection {
        id,
        title,
        note,
        items,
    })
}

fn item_from_entry(entry: &Literal) -> Option<CatalogItem> {
    let title = entry.get("title")?.as_str()?.to_owned();
    Some(CatalogItem {
        title,
        icon: string_field(entry, "icon"),
        description: string_field(entry, "description"),
        netdisk_link: string_field(entry, "netdiskLink"),
        primary_link: string_field(entry, "primaryLink"),
        mirror_link: string_field(entry, "mirrorLink"),
    })
}

fn string_field(entry: &Literal, key: &str) -> Option<String> {
    entry.get(key).and_then(Literal::as_str).map(str::to_owned)
}
