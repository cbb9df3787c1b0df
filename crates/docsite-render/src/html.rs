//! Media extraction from raw HTML fragments.
//!
//! The generic Markdown parser hands raw HTML through untouched. The only
//! tags the renderer special-cases are `<img>` and `<iframe>`; everything
//! else stays a raw passthrough node.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::VisualNode;

static MEDIA_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(img|iframe)\b([^>]*?)/?>(?:\s*</iframe\s*>)?").expect("media tag pattern")
});
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
        .expect("attribute pattern")
});
static DANGLING_IFRAME_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*</iframe\s*>\s*$").expect("iframe close pattern"));

/// Parse a raw HTML fragment into visual nodes, extracting media tags.
pub(crate) fn parse_fragment(html: &str) -> Vec<VisualNode> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    for caps in MEDIA_TAG.captures_iter(html) {
        let all = caps.get(0).expect("whole match");
        push_raw(&html[cursor..all.start()], &mut nodes);
        cursor = all.end();

        let attrs = parse_attrs(&caps[2]);
        if caps[1].eq_ignore_ascii_case("img") {
            nodes.push(VisualNode::Image {
                src: attr_value(&attrs, "src").unwrap_or_default(),
                alt: attr_value(&attrs, "alt").unwrap_or_default(),
            });
        } else {
            nodes.push(VisualNode::Iframe {
                src: attr_value(&attrs, "src").unwrap_or_default(),
                allow_fullscreen: fullscreen_allowed(&attrs),
            });
        }
    }

    push_raw(&html[cursor..], &mut nodes);
    nodes
}

fn push_raw(html: &str, nodes: &mut Vec<VisualNode>) {
    if html.trim().is_empty() {
        return;
    }
    // a closing tag split off its open tag by the event stream
    if DANGLING_IFRAME_CLOSE.is_match(html) {
        return;
    }
    nodes.push(VisualNode::RawHtml(html.to_owned()));
}

type Attr = (String, Option<String>);

fn parse_attrs(input: &str) -> Vec<Attr> {
    ATTR.captures_iter(input)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_owned());
            (name, value)
        })
        .collect()
}

fn attr_value(attrs: &[Attr], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(attr, _)| attr == name)
        .and_then(|(_, value)| value.clone())
}

/// Normalize the fullscreen permission from any of its accepted spellings:
/// `true`, the string `"true"`, an empty value, or the bareword form.
fn fullscreen_allowed(attrs: &[Attr]) -> bool {
    let Some((_, value)) = attrs.iter().find(|(attr, _)| attr == "allowfullscreen") else {
        return false;
    };
    match value {
        None => true,
        Some(value) => {
            value.is_empty()
                || value.eq_ignore_ascii_case("true")
                || value.eq_ignore_ascii_case("allowfullscreen")
        }
    }
}
