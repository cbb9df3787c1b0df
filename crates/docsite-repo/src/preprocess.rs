//! The fixed preprocessing chain that turns legacy authoring syntax into
//! portable Markdown.
//!
//! Stage order is load-bearing and must not change: admonition conversion
//! assumes script blocks are already gone, link mapping assumes asset paths
//! are already canonical, and blank-line collapsing cleans up after every
//! earlier stage. Each stage is a total function over the input string and
//! idempotent when reapplied to its own output.

use std::sync::LazyLock;

use docsite_config::RouteSettings;
use regex::{Captures, Regex};

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("script pattern"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").expect("style pattern"));
static EMPTY_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<comp\b[^>]*></comp>").expect("component pattern"));
static ADMONITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is):::(tip|warning|danger)(?:[ \t]+([^\n]*))?\n(.*?)\n:::")
        .expect("admonition pattern")
});
static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("image pattern"));
static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img([^>]*?)src=["']([^"']+)["']([^>]*)>"#).expect("img tag pattern")
});
static INTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\((/[^)]+)\)").expect("internal link pattern"));
static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("absolute url pattern"));
static EMPTY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]*$").expect("empty heading pattern"));
static EXCESS_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run pattern"));

/// Apply the full transform chain to a document body.
pub fn normalize(body: &str, routes: &RouteSettings) -> String {
    let output = strip_embedded_code(body);
    let output = convert_admonitions(&output);
    let output = rewrite_asset_refs(&output, routes);
    let output = map_internal_links(&output, routes);
    let output = remove_empty_headings(&output);
    collapse_blank_lines(&output)
}

/// Stage 1: drop authoring-tool script/style blocks and empty component tag
/// pairs. Legacy widget source has no equivalent in the target renderer and
/// must not leak as literal text.
pub(crate) fn strip_embedded_code(input: &str) -> String {
    let output = SCRIPT_BLOCK.replace_all(input, "");
    let output = STYLE_BLOCK.replace_all(&output, "");
    EMPTY_COMPONENT.replace_all(&output, "").into_owned()
}

/// Stage 2: convert `:::kind title` fenced admonitions into block quotes
/// carrying a `> [!KIND] Title` marker paragraph. Downstream rendering only
/// special-cases quote blocks, so all admonition syntax funnels through this
/// one convention.
pub(crate) fn convert_admonitions(input: &str) -> String {
    ADMONITION
        .replace_all(input, |caps: &Captures<'_>| {
            let kind = caps[1].to_uppercase();
            let title = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            let header = if title.is_empty() {
                format!("> [!{kind}]")
            } else {
                format!("> [!{kind}] {title}")
            };

            let quoted: Vec<String> = caps[3]
                .trim()
                .lines()
                .map(|line| {
                    if line.trim().is_empty() {
                        ">".to_owned()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect();

            // the empty quoted line keeps the marker in its own paragraph
            format!("{header}\n>\n{}", quoted.join("\n"))
        })
        .into_owned()
}

/// Stage 3: rewrite every image reference to the flat asset root, keeping
/// only the filename. Two authored paths sharing a basename collide to the
/// same URL; that is documented behaviour of the deployed layout.
pub(crate) fn rewrite_asset_refs(input: &str, routes: &RouteSettings) -> String {
    let output = MD_IMAGE.replace_all(input, |caps: &Captures<'_>| {
        format!(
            "![{}]({}{})",
            &caps[1],
            routes.asset_root,
            file_name(&caps[2])
        )
    });
    HTML_IMAGE
        .replace_all(&output, |caps: &Captures<'_>| {
            format!(
                "<img{}src=\"{}{}\"{}>",
                &caps[1],
                routes.asset_root,
                file_name(&caps[2]),
                &caps[3]
            )
        })
        .into_owned()
}

/// Final path segment of an authored asset reference. Handles both Windows
/// and Unix separators; a trailing separator leaves the source untouched.
fn file_name(src: &str) -> String {
    let unix = src.replace('\\', "/");
    match unix.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => unix,
    }
}

/// Stage 4: reconcile authoring-time link conventions with the deployed
/// route structure for every root-relative link target.
pub(crate) fn map_internal_links(input: &str, routes: &RouteSettings) -> String {
    INTERNAL_LINK
        .replace_all(input, |caps: &Captures<'_>| {
            format!("]({})", map_link(&caps[1], routes))
        })
        .into_owned()
}

/// Map one link target. Absolute URLs, fragments, and targets already under
/// the asset or docs roots pass through; download-prefixed paths collapse to
/// the bare download route; any other rooted path gains the docs prefix.
pub(crate) fn map_link(link: &str, routes: &RouteSettings) -> String {
    if ABSOLUTE_URL.is_match(link) || link.starts_with('#') {
        return link.to_owned();
    }
    if link.starts_with(&routes.asset_root) {
        return link.to_owned();
    }
    if link.starts_with(&routes.download_route) {
        return routes.download_route.clone();
    }
    if link.starts_with(&routes.docs_root) {
        return link.to_owned();
    }
    if link.starts_with('/') {
        let trimmed = link.strip_suffix('/').unwrap_or(link);
        return format!("{}{}", routes.docs_root, trimmed);
    }
    link.to_owned()
}

/// Stage 5: delete heading markers with no text.
pub(crate) fn remove_empty_headings(input: &str) -> String {
    EMPTY_HEADING.replace_all(input, "").into_owned()
}

/// Stage 6: collapse runs of three or more newlines to one blank line, then
/// trim the whole document.
pub(crate) fn collapse_blank_lines(input: &str) -> String {
    EXCESS_BLANKS.replace_all(input, "\n\n").trim().to_owned()
}

/// First `# ` heading in a normalized body, if any.
pub fn extract_title(normalized: &str) -> Option<String> {
    normalized
        .lines()
        .find_map(|line| line.trim().strip_prefix("# ").map(|rest| rest.trim().to_owned()))
        .filter(|title| !title.is_empty())
}

/// Humanized fallback title derived from the last slug segment.
pub fn fallback_title(slug: &[String]) -> String {
    slug.last()
        .map(|segment| segment.replace(['-', '_'], " "))
        .unwrap_or_default()
}
