use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use docsite_config::{Config, ConfigError, LoadOptions};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.content.root, working_dir.join("raw"));
    assert_eq!(config.content.catalog_file, PathBuf::from("dlc.md"));
    assert!(config.content.hidden.contains("download"));
    assert!(config.content.hidden.contains("start/old_launch"));
    assert!(config.content.exclude.is_empty());
    assert_eq!(config.routes.asset_root, "/imgs/");
    assert_eq!(config.routes.docs_root, "/docs");
    assert_eq!(config.routes.download_route, "/download");
    assert_eq!(config.version.feed, working_dir.join("public/version.json"));
    assert_eq!(config.version.fresh_days, 3);
}

#[test]
fn local_file_overrides_defaults() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    write_file(
        working_dir.join(".docsite.toml"),
        r#"
        [content]
        root = "content"
        hidden = ["internal/notes"]
        exclude = ["drafts/**"]

        [routes]
        asset_root = "/static"
        docs_root = "/manual/"
        "#,
    );

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load local config");

    assert_eq!(config.content.root, working_dir.join("content"));
    assert!(config.content.hidden.contains("internal/notes"));
    assert!(!config.content.hidden.contains("download"));
    assert!(config.content.exclude.is_match(Path::new("drafts/wip.md")));
    // asset root gains a trailing slash, docs root loses one
    assert_eq!(config.routes.asset_root, "/static/");
    assert_eq!(config.routes.docs_root, "/manual");
    // untouched table keeps defaults
    assert_eq!(config.routes.download_route, "/download");
}

#[test]
fn override_path_beats_local_file() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    write_file(
        working_dir.join(".docsite.toml"),
        "[content]\nroot = \"local\"\n",
    );
    write_file(
        working_dir.join("override.toml"),
        "[content]\nroot = \"overridden\"\n",
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(working_dir.clone())
            .with_override_path(working_dir.join("override.toml")),
    )
    .expect("load override config");

    assert_eq!(config.content.root, working_dir.join("overridden"));
}

#[test]
fn missing_override_is_an_error() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(working_dir.clone())
            .with_override_path(working_dir.join("absent.toml")),
    )
    .expect_err("override must exist");

    assert!(matches!(err, ConfigError::OverrideNotFound { .. }));
}

#[test]
fn invalid_glob_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    write_file(
        working_dir.join(".docsite.toml"),
        "[content]\nexclude = [\"[unclosed\"]\n",
    );

    let err = Config::load(LoadOptions::default().with_working_dir(working_dir))
        .expect_err("glob must fail to compile");

    assert!(matches!(err, ConfigError::InvalidPattern { .. }));
}

#[test]
fn malformed_toml_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    write_file(working_dir.join(".docsite.toml"), "content = not-a-table\n");

    let err = Config::load(LoadOptions::default().with_working_dir(working_dir))
        .expect_err("parse must fail");

    assert!(matches!(err, ConfigError::Parse { .. }));
}
