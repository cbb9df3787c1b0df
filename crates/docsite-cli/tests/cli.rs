use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

fn docsite(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docsite").expect("binary under test");
    cmd.current_dir(dir.path());
    cmd
}

fn seed_corpus(dir: &TempDir) {
    write_file(dir, "raw/start/install.md", "# 安装指南\n\n内容。\n");
    write_file(dir, "raw/download.md", "# 下载\n");
    write_file(
        dir,
        "raw/dlc.md",
        "<script setup>\nconst dlcSections = [{id: \"a\", title: \"A\", items: [{title: \"X\", netdiskLink: \"http://x\"}]}]\n</script>\n",
    );
}

#[test]
fn list_excludes_hidden_slugs() {
    let temp = TempDir::new().expect("tempdir");
    seed_corpus(&temp);

    docsite(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("start/install\t安装指南\tstart"))
        .stdout(predicate::str::contains("download").not());
}

#[test]
fn show_prints_normalized_content_and_fails_on_unknown_slug() {
    let temp = TempDir::new().expect("tempdir");
    seed_corpus(&temp);

    docsite(&temp)
        .args(["show", "start/install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# 安装指南"));

    docsite(&temp)
        .args(["show", "missing/doc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("document not found"));
}

#[test]
fn catalog_renders_markdown_and_json() {
    let temp = TempDir::new().expect("tempdir");
    seed_corpus(&temp);

    docsite(&temp)
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("[网盘](http://x)"));

    docsite(&temp)
        .args(["catalog", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"netdiskLink\": \"http://x\""));
}

#[test]
fn catalog_degrades_to_fallback_without_literal() {
    let temp = TempDir::new().expect("tempdir");
    write_file(&temp, "raw/dlc.md", "# 空目录\n");

    docsite(&temp)
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("当前版本未解析出 DLC 内容"));
}

#[test]
fn version_falls_back_when_feed_is_missing() {
    let temp = TempDir::new().expect("tempdir");

    docsite(&temp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest"));
}

#[test]
fn root_override_points_discovery_elsewhere() {
    let temp = TempDir::new().expect("tempdir");
    write_file(&temp, "content/a.md", "# 另一个根\n");
    assert!(Path::new(&temp.path().join("content/a.md")).exists());

    docsite(&temp)
        .args(["--root", "content", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("另一个根"));
}
