//! Latest-version summary derived from the release feed.
//!
//! The feed is a JSON array of release entries, newest first. Only the first
//! complete entry matters; every failure path falls back to a fixed entry so
//! the surrounding page never breaks.

use std::fs;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use docsite_config::VersionSettings;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, Deserialize)]
struct FeedEntry {
    link: Option<String>,
    version: Option<String>,
    date: Option<String>,
}

/// Summary of the newest release in the feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LatestVersion {
    pub version: String,
    pub link: String,
    pub date: String,
    pub is_recent: bool,
}

/// Read the configured feed and summarise its newest entry.
pub fn latest_version(settings: &VersionSettings) -> LatestVersion {
    latest_version_at(settings, Utc::now())
}

fn latest_version_at(settings: &VersionSettings, now: DateTime<Utc>) -> LatestVersion {
    let fallback = LatestVersion {
        version: "Latest".to_owned(),
        link: settings.fallback_link.clone(),
        date: "1970/1/1".to_owned(),
        is_recent: false,
    };

    let raw = match fs::read_to_string(&settings.feed) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(path = %settings.feed.display(), error = %err, "version feed unreadable");
            return fallback;
        }
    };
    let entries: Vec<FeedEntry> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(error = %err, "version feed malformed");
            return fallback;
        }
    };
    let Some(first) = entries.into_iter().next() else {
        return fallback;
    };
    let (Some(link), Some(version), Some(date)) = (first.link, first.version, first.date) else {
        return fallback;
    };

    let is_recent = parse_feed_date(&date)
        .map(|released| released > now - Duration::days(settings.fresh_days))
        .unwrap_or(false);

    LatestVersion {
        version,
        link,
        date,
        is_recent,
    }
}

fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    // the feed uses slash-separated dates, occasionally without zero padding
    let date = NaiveDate::parse_from_str(raw, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings(feed: PathBuf) -> VersionSettings {
        VersionSettings {
            feed,
            fallback_link: "https://example.com/fallback".to_owned(),
            fresh_days: 3,
        }
    }

    fn write_feed(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("version.json");
        let mut file = fs::File::create(&path).expect("create feed");
        file.write_all(contents.as_bytes()).expect("write feed");
        path
    }

    #[test]
    fn summarises_newest_entry() {
        let temp = TempDir::new().expect("tempdir");
        let feed = write_feed(
            &temp,
            r#"[{"link": "https://pan/x", "version": "5.0", "date": "2025/8/24", "changes": ["a"]},
               {"link": "https://pan/y", "version": "4.9", "date": "2025/7/1"}]"#,
        );
        let now = parse_feed_date("2025/8/25").expect("date");
        let latest = latest_version_at(&settings(feed), now);
        assert_eq!(latest.version, "5.0");
        assert_eq!(latest.link, "https://pan/x");
        assert!(latest.is_recent);
    }

    #[test]
    fn old_release_is_not_flagged_recent() {
        let temp = TempDir::new().expect("tempdir");
        let feed = write_feed(
            &temp,
            r#"[{"link": "https://pan/x", "version": "5.0", "date": "2025/1/1"}]"#,
        );
        let now = parse_feed_date("2025/8/25").expect("date");
        assert!(!latest_version_at(&settings(feed), now).is_recent);
    }

    #[test]
    fn missing_or_malformed_feed_falls_back() {
        let temp = TempDir::new().expect("tempdir");
        let absent = settings(temp.path().join("absent.json"));
        let latest = latest_version_at(&absent, Utc::now());
        assert_eq!(latest.version, "Latest");
        assert_eq!(latest.link, "https://example.com/fallback");

        let broken = settings(write_feed(&temp, "not json"));
        assert_eq!(latest_version_at(&broken, Utc::now()).version, "Latest");

        let incomplete = settings(write_feed(&temp, r#"[{"version": "5.0"}]"#));
        assert_eq!(latest_version_at(&incomplete, Utc::now()).version, "Latest");
    }
}
