//! Visual tree node types produced by the renderer.

/// Callout kinds recognised inside quote blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalloutKind {
    Tip,
    Warning,
    Danger,
}

impl CalloutKind {
    /// Parse a marker kind, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "tip" => Some(CalloutKind::Tip),
            "warning" => Some(CalloutKind::Warning),
            "danger" => Some(CalloutKind::Danger),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CalloutKind::Tip => "tip",
            CalloutKind::Warning => "warning",
            CalloutKind::Danger => "danger",
        }
    }

    /// Localized title used when the marker carries none.
    pub fn default_title(self) -> &'static str {
        match self {
            CalloutKind::Tip => "提示",
            CalloutKind::Warning => "警告",
            CalloutKind::Danger => "危险",
        }
    }
}

/// A node of the rendered visual tree.
///
/// `Container` is a demoted paragraph: it carries paragraph children whose
/// block-level members (images, iframes, tables) must not sit inside
/// paragraph-semantic markup.
#[derive(Clone, Debug, PartialEq)]
pub enum VisualNode {
    Text(String),
    Paragraph(Vec<VisualNode>),
    Container(Vec<VisualNode>),
    Heading {
        level: u8,
        children: Vec<VisualNode>,
    },
    Quote(Vec<VisualNode>),
    Callout {
        kind: CalloutKind,
        title: String,
        body: Vec<VisualNode>,
    },
    Image {
        src: String,
        alt: String,
    },
    Iframe {
        src: String,
        allow_fullscreen: bool,
    },
    /// Horizontally scrollable wrapper around a table.
    Scrollable(Vec<VisualNode>),
    TableHead(Vec<VisualNode>),
    TableRow(Vec<VisualNode>),
    TableCell(Vec<VisualNode>),
    List {
        ordered: bool,
        items: Vec<VisualNode>,
    },
    ListItem(Vec<VisualNode>),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    InlineCode(String),
    Link {
        href: String,
        children: Vec<VisualNode>,
    },
    Emphasis(Vec<VisualNode>),
    Strong(Vec<VisualNode>),
    Strikethrough(Vec<VisualNode>),
    Break,
    Rule,
    RawHtml(String),
}

impl VisualNode {
    /// Whether this node is block-level and forces an enclosing paragraph to
    /// demote itself to a plain container.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            VisualNode::Image { .. } | VisualNode::Iframe { .. } | VisualNode::Scrollable(_)
        )
    }

    /// Child nodes, for tree walks. Leaves yield an empty slice.
    pub fn children(&self) -> &[VisualNode] {
        match self {
            VisualNode::Paragraph(children)
            | VisualNode::Container(children)
            | VisualNode::Quote(children)
            | VisualNode::Scrollable(children)
            | VisualNode::TableHead(children)
            | VisualNode::TableRow(children)
            | VisualNode::TableCell(children)
            | VisualNode::ListItem(children)
            | VisualNode::Emphasis(children)
            | VisualNode::Strong(children)
            | VisualNode::Strikethrough(children) => children,
            VisualNode::Heading { children, .. } | VisualNode::Link { children, .. } => children,
            VisualNode::List { items, .. } => items,
            VisualNode::Callout { body, .. } => body,
            _ => &[],
        }
    }
}

/// Depth-first text accumulation over a node's subtree. String leaves
/// concatenate; element nodes recurse into their children. Media nodes
/// contribute nothing, keeping marker matching robust to inline formatting.
pub fn flatten_text(node: &VisualNode) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &VisualNode, out: &mut String) {
    match node {
        VisualNode::Text(text) | VisualNode::InlineCode(text) => out.push_str(text),
        VisualNode::CodeBlock { code, .. } => out.push_str(code),
        VisualNode::Image { .. }
        | VisualNode::Iframe { .. }
        | VisualNode::RawHtml(_)
        | VisualNode::Break
        | VisualNode::Rule => {}
        other => {
            for child in other.children() {
                collect_text(child, out);
            }
        }
    }
}
