//! Block-structure renderer: normalized Markdown to a visual tree.
//!
//! The renderer consumes normalized Markdown and re-homes inline-context
//! block elements so they never sit inside paragraph-semantic markup:
//! images and iframes are block-tagged, paragraphs holding a block child
//! demote themselves to plain containers, tables gain a scrollable wrapper,
//! and quote blocks carrying the `[!KIND]` marker convention become styled
//! callouts. Each render is an independent pure mapping; no state survives
//! between invocations.

mod html;
mod node;

pub use node::{flatten_text, CalloutKind, VisualNode};

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use regex::Regex;

static CALLOUT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[!\s*(TIP|WARNING|DANGER)\]\s*(.*)$").expect("callout marker pattern")
});

/// Render normalized Markdown into a visual tree.
pub fn render(content: &str) -> Vec<VisualNode> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    build_tree(Parser::new_ext(content, options))
}

fn build_tree<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<VisualNode> {
    let mut root: Vec<VisualNode> = Vec::new();
    let mut stack: Vec<(Tag<'a>, Vec<VisualNode>)> = Vec::new();

    let mut push = |stack: &mut Vec<(Tag<'a>, Vec<VisualNode>)>,
                    root: &mut Vec<VisualNode>,
                    node: VisualNode| {
        match stack.last_mut() {
            Some((_, children)) => children.push(node),
            None => root.push(node),
        }
    };

    for event in events {
        match event {
            Event::Start(tag) => stack.push((tag, Vec::new())),
            Event::End(_) => {
                let Some((tag, children)) = stack.pop() else {
                    continue;
                };
                let node = close_element(tag, children);
                push(&mut stack, &mut root, node);
            }
            Event::Text(text) => push(&mut stack, &mut root, VisualNode::Text(text.to_string())),
            Event::Code(code) => {
                push(&mut stack, &mut root, VisualNode::InlineCode(code.to_string()))
            }
            Event::Html(fragment) => {
                for node in html::parse_fragment(&fragment) {
                    push(&mut stack, &mut root, node);
                }
            }
            Event::SoftBreak => push(&mut stack, &mut root, VisualNode::Text("\n".to_owned())),
            Event::HardBreak => push(&mut stack, &mut root, VisualNode::Break),
            Event::Rule => push(&mut stack, &mut root, VisualNode::Rule),
            Event::TaskListMarker(_) | Event::FootnoteReference(_) => {}
        }
    }

    root
}

fn close_element(tag: Tag<'_>, children: Vec<VisualNode>) -> VisualNode {
    match tag {
        // structural rule: block content must not nest inside a paragraph
        Tag::Paragraph => {
            if children.iter().any(VisualNode::is_block) {
                VisualNode::Container(children)
            } else {
                VisualNode::Paragraph(children)
            }
        }
        Tag::BlockQuote => close_quote(children),
        Tag::Heading(level, _, _) => VisualNode::Heading {
            level: heading_depth(level),
            children,
        },
        Tag::CodeBlock(kind) => {
            let language = match kind {
                CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                _ => None,
            };
            let code = children.iter().map(flatten_text).collect();
            VisualNode::CodeBlock { language, code }
        }
        Tag::List(start) => VisualNode::List {
            ordered: start.is_some(),
            items: children,
        },
        Tag::Item => VisualNode::ListItem(children),
        Tag::Table(_) => VisualNode::Scrollable(children),
        Tag::TableHead => VisualNode::TableHead(children),
        Tag::TableRow => VisualNode::TableRow(children),
        Tag::TableCell => VisualNode::TableCell(children),
        Tag::Emphasis => VisualNode::Emphasis(children),
        Tag::Strong => VisualNode::Strong(children),
        Tag::Strikethrough => VisualNode::Strikethrough(children),
        Tag::Link(_, url, _) => VisualNode::Link {
            href: url.to_string(),
            children,
        },
        Tag::Image(_, url, _) => {
            let alt = children.iter().map(flatten_text).collect();
            VisualNode::Image {
                src: url.to_string(),
                alt,
            }
        }
        Tag::FootnoteDefinition(_) => VisualNode::Container(children),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Callout detection over a finished quote block. The first child must be a
/// paragraph whose flattened text carries the `[!KIND] title` marker;
/// otherwise the quote renders unchanged. The marker paragraph and any
/// immediately-following empty paragraphs are removed from the body.
fn close_quote(children: Vec<VisualNode>) -> VisualNode {
    let Some(first @ VisualNode::Paragraph(_)) = children.first() else {
        return VisualNode::Quote(children);
    };
    let line = flatten_text(first);
    let Some(caps) = CALLOUT_MARKER.captures(line.trim()) else {
        return VisualNode::Quote(children);
    };
    let Some(kind) = CalloutKind::parse(&caps[1]) else {
        return VisualNode::Quote(children);
    };
    let explicit = caps[2].trim();
    let title = if explicit.is_empty() {
        kind.default_title().to_owned()
    } else {
        explicit.to_owned()
    };

    let mut body: Vec<VisualNode> = children.into_iter().skip(1).collect();
    let keep_from = body
        .iter()
        .position(|node| !is_empty_paragraph(node))
        .unwrap_or(body.len());
    body.drain(..keep_from);

    VisualNode::Callout { kind, title, body }
}

fn is_empty_paragraph(node: &VisualNode) -> bool {
    matches!(node, VisualNode::Paragraph(_)) && flatten_text(node).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> VisualNode {
        VisualNode::Paragraph(vec![VisualNode::Text(text.to_owned())])
    }

    #[test]
    fn text_paragraph_stays_a_paragraph() {
        let tree = render("普通段落。");
        assert_eq!(tree, vec![paragraph("普通段落。")]);
    }

    #[test]
    fn paragraph_with_image_child_demotes_to_container() {
        let tree = render("![截图](/imgs/shot.png)");
        assert_eq!(
            tree,
            vec![VisualNode::Container(vec![VisualNode::Image {
                src: "/imgs/shot.png".to_owned(),
                alt: "截图".to_owned(),
            }])]
        );
    }

    #[test]
    fn html_iframe_in_paragraph_demotes_too() {
        let tree = render("<iframe src=\"https://player/x\" allowfullscreen></iframe>\n");
        match tree.as_slice() {
            [VisualNode::Container(children)] | [VisualNode::Paragraph(children)] => {
                assert!(children.iter().any(|node| matches!(
                    node,
                    VisualNode::Iframe {
                        allow_fullscreen: true,
                        ..
                    }
                )));
            }
            [VisualNode::Iframe {
                allow_fullscreen, ..
            }] => assert!(*allow_fullscreen),
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn marked_quote_becomes_callout_with_explicit_title() {
        let tree = render("> [!TIP] 提示标题\n>\n> 正文内容\n");
        assert_eq!(
            tree,
            vec![VisualNode::Callout {
                kind: CalloutKind::Tip,
                title: "提示标题".to_owned(),
                body: vec![paragraph("正文内容")],
            }]
        );
    }

    #[test]
    fn untitled_markers_use_localized_defaults() {
        let cases = [
            ("> [!TIP]\n>\n> x\n", CalloutKind::Tip, "提示"),
            ("> [!warning]\n>\n> x\n", CalloutKind::Warning, "警告"),
            ("> [!Danger]\n>\n> x\n", CalloutKind::Danger, "危险"),
        ];
        for (input, kind, title) in cases {
            let tree = render(input);
            assert_eq!(
                tree,
                vec![VisualNode::Callout {
                    kind,
                    title: title.to_owned(),
                    body: vec![paragraph("x")],
                }],
                "{input}"
            );
        }
    }

    #[test]
    fn unmarked_quote_renders_as_plain_quote() {
        let tree = render("> 只是引用\n");
        assert_eq!(tree, vec![VisualNode::Quote(vec![paragraph("只是引用")])]);
    }

    #[test]
    fn unknown_marker_kind_is_not_a_callout() {
        let tree = render("> [!NOTE] 不支持\n");
        assert!(matches!(tree.as_slice(), [VisualNode::Quote(_)]));
    }

    #[test]
    fn tables_gain_a_scrollable_wrapper() {
        let tree = render("| a | b |\n| - | - |\n| 1 | 2 |\n");
        let [VisualNode::Scrollable(children)] = tree.as_slice() else {
            panic!("expected scrollable table, got {tree:?}");
        };
        assert!(children
            .iter()
            .any(|node| matches!(node, VisualNode::TableHead(_))));
        assert!(children
            .iter()
            .any(|node| matches!(node, VisualNode::TableRow(_))));
    }

    #[test]
    fn marker_matching_survives_inline_formatting() {
        // emphasis inside the marker line still flattens to a clean match
        let tree = render("> [!WARNING] **重要** 标题\n>\n> x\n");
        let [VisualNode::Callout { kind, title, .. }] = tree.as_slice() else {
            panic!("expected callout, got {tree:?}");
        };
        assert_eq!(*kind, CalloutKind::Warning);
        assert_eq!(title, "重要 标题");
    }

    #[test]
    fn callout_body_drops_leading_empty_paragraphs_only() {
        let quote = vec![
            paragraph("[!TIP]"),
            paragraph("  "),
            paragraph(""),
            paragraph("正文"),
            paragraph(""),
        ];
        let VisualNode::Callout { body, .. } = super::close_quote(quote) else {
            panic!("expected callout");
        };
        assert_eq!(body, vec![paragraph("正文"), paragraph("")]);
    }

    #[test]
    fn end_to_end_with_preprocessed_admonition_shape() {
        // shape produced by the admonition conversion stage
        let tree = render("> [!WARNING]\n>\n> Check this.\n");
        assert_eq!(
            tree,
            vec![VisualNode::Callout {
                kind: CalloutKind::Warning,
                title: "警告".to_owned(),
                body: vec![paragraph("Check this.")],
            }]
        );
    }
}
