//! Configuration primitives and loader for the docsite content pipeline.
//!
//! The loader resolves configuration using a small precedence stack:
//! override flag → working directory → built-in defaults. The defaults
//! reproduce the deployed site layout (content under `raw/`, assets served
//! from a flat `/imgs/` directory, docs routed under `/docs`). Parsed
//! settings are normalised into typed structures so downstream crates can
//! operate without touching raw TOML.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".docsite.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub content: ContentSettings,
    pub routes: RouteSettings,
    pub version: VersionSettings,
    pub working_dir: PathBuf,
}

/// Settings describing where authored content lives and which documents are
/// withheld from navigation.
#[derive(Clone, Debug)]
pub struct ContentSettings {
    /// Absolute path to the directory of authored Markdown files.
    pub root: PathBuf,
    /// Path of the catalog document, relative to `root`. This document
    /// bypasses the preprocessing chain entirely.
    pub catalog_file: PathBuf,
    /// Slugs excluded from navigation listings.
    pub hidden: HashSet<String>,
    /// Glob patterns excluded from discovery altogether.
    pub exclude: PatternList,
}

/// Route prefixes applied while rewriting authored links and asset paths.
#[derive(Clone, Debug)]
pub struct RouteSettings {
    /// Flat directory all images are served from. Always ends with `/`.
    pub asset_root: String,
    /// Route prefix for documentation pages. Never ends with `/`.
    pub docs_root: String,
    /// Bare route every download-prefixed link collapses to.
    pub download_route: String,
}

/// Settings for the release feed backing the latest-version summary.
#[derive(Clone, Debug)]
pub struct VersionSettings {
    /// Absolute path to the JSON feed, newest entry first.
    pub feed: PathBuf,
    /// Download link used when the feed is missing or malformed.
    pub fallback_link: String,
    /// A release younger than this many days is flagged as recent.
    pub fresh_days: i64,
}

/// Ordered list of glob patterns with pre-compiled matchers.
#[derive(Clone, Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    fn compile(source: &Path, values: Vec<String>) -> Result<Self, ConfigError> {
        let patterns = values
            .into_iter()
            .map(|value| Pattern::new(source, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PatternList { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matcher.is_match(path))
    }
}

/// Glob pattern plus compiled matcher helper.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    fn new(source: &Path, value: String) -> Result<Self, ConfigError> {
        match Glob::new(&value) {
            Ok(glob) => Ok(Pattern {
                matcher: glob.compile_matcher(),
                original: value,
            }),
            Err(err) => Err(ConfigError::InvalidPattern {
                path: source.to_path_buf(),
                pattern: value,
                source: err,
            }),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid glob pattern '{pattern}' in {path}: {source}")]
    InvalidPattern {
        path: PathBuf,
        pattern: String,
        source: globset::Error,
    },
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed
    /// settings with all paths made absolute against the working directory.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let mut raw = RawConfig::default();
        let local_path = working_dir.join(CONFIG_FILE_NAME);
        if local_path.exists() && Some(&local_path) != override_path.as_ref() {
            raw.merge(load_layer(&local_path)?);
        }
        if let Some(path) = &override_path {
            raw.merge(load_layer(path)?);
        }

        let source = override_path.unwrap_or(local_path);
        raw.finalize(&working_dir, &source)
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    content: Option<RawContent>,
    routes: Option<RawRoutes>,
    version: Option<RawVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContent {
    root: Option<PathBuf>,
    catalog_file: Option<PathBuf>,
    hidden: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoutes {
    asset_root: Option<String>,
    docs_root: Option<String>,
    download_route: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVersion {
    feed: Option<PathBuf>,
    fallback_link: Option<String>,
    fresh_days: Option<i64>,
}

impl RawConfig {
    /// Merge a higher-precedence layer over this one, field by field.
    fn merge(&mut self, other: RawConfig) {
        let content = self.content.get_or_insert_with(RawContent::default);
        if let Some(other) = other.content {
            content.root = other.root.or(content.root.take());
            content.catalog_file = other.catalog_file.or(content.catalog_file.take());
            content.hidden = other.hidden.or(content.hidden.take());
            content.exclude = other.exclude.or(content.exclude.take());
        }
        let routes = self.routes.get_or_insert_with(RawRoutes::default);
        if let Some(other) = other.routes {
            routes.asset_root = other.asset_root.or(routes.asset_root.take());
            routes.docs_root = other.docs_root.or(routes.docs_root.take());
            routes.download_route = other.download_route.or(routes.download_route.take());
        }
        let version = self.version.get_or_insert_with(RawVersion::default);
        if let Some(other) = other.version {
            version.feed = other.feed.or(version.feed.take());
            version.fallback_link = other.fallback_link.or(version.fallback_link.take());
            version.fresh_days = other.fresh_days.or(version.fresh_days.take());
        }
    }

    fn finalize(self, working_dir: &Path, source: &Path) -> Result<Config, ConfigError> {
        let content = self.content.unwrap_or_default();
        let routes = self.routes.unwrap_or_default();
        let version = self.version.unwrap_or_default();

        let root = make_absolute(&content.root.unwrap_or_else(|| PathBuf::from("raw")), working_dir);
        let hidden = content
            .hidden
            .unwrap_or_else(|| vec!["download".to_owned(), "start/old_launch".to_owned()])
            .into_iter()
            .collect();
        let exclude = PatternList::compile(source, content.exclude.unwrap_or_default())?;

        let asset_root = normalize_asset_root(
            routes.asset_root.unwrap_or_else(|| "/imgs/".to_owned()),
        );
        let docs_root = routes
            .docs_root
            .unwrap_or_else(|| "/docs".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let download_route = routes
            .download_route
            .unwrap_or_else(|| "/download".to_owned())
            .trim_end_matches('/')
            .to_owned();

        let feed = make_absolute(
            &version
                .feed
                .unwrap_or_else(|| PathBuf::from("public/version.json")),
            working_dir,
        );

        Ok(Config {
            content: ContentSettings {
                root,
                catalog_file: content.catalog_file.unwrap_or_else(|| PathBuf::from("dlc.md")),
                hidden,
                exclude,
            },
            routes: RouteSettings {
                asset_root,
                docs_root,
                download_route,
            },
            version: VersionSettings {
                feed,
                fallback_link: version
                    .fallback_link
                    .unwrap_or_else(|| "https://pan.quark.cn/s/f5476dfbde71".to_owned()),
                fresh_days: version.fresh_days.unwrap_or(3),
            },
            working_dir: working_dir.to_path_buf(),
        })
    }
}

fn normalize_asset_root(mut value: String) -> String {
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}
