//! Front-matter splitting for authored documents.
//!
//! The corpus only ever uses flat `key: value` scalars, so the matter is
//! kept as a plain string map. Nothing downstream consumes it yet, but the
//! fence must still be stripped so it never leaks into rendered output.

use std::collections::BTreeMap;

/// Split an optional leading front-matter fence off a document. Returns the
/// parsed matter and the remaining body. Documents without a fence, or with
/// an unterminated fence, pass through untouched.
pub fn split_front_matter(source: &str) -> (BTreeMap<String, String>, &str) {
    let mut matter = BTreeMap::new();

    let mut lines = source.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (matter, source);
    };
    if first.trim_end() != "---" {
        return (matter, source);
    }

    let mut offset = first.len();
    for line in lines {
        let trimmed = line.trim_end();
        offset += line.len();
        if trimmed == "---" || trimmed == "..." {
            return (matter, &source[offset..]);
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                matter.insert(key.to_owned(), value.trim().to_owned());
            }
        }
    }

    // no closing fence; treat the whole document as body
    (BTreeMap::new(), source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_fence_and_parses_scalars() {
        let source = "---\ntitle: 开始使用\ndraft: false\n---\n# 正文\n";
        let (matter, body) = split_front_matter(source);
        assert_eq!(matter.get("title").map(String::as_str), Some("开始使用"));
        assert_eq!(matter.get("draft").map(String::as_str), Some("false"));
        assert_eq!(body, "# 正文\n");
    }

    #[test]
    fn document_without_fence_passes_through() {
        let source = "# 正文\n---\n不是 front matter\n";
        let (matter, body) = split_front_matter(source);
        assert!(matter.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn unterminated_fence_is_left_alone() {
        let source = "---\ntitle: 孤儿\n";
        let (matter, body) = split_front_matter(source);
        assert!(matter.is_empty());
        assert_eq!(body, source);
    }
}
