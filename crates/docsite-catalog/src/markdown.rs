//! Flattened Markdown rendition of the catalog.
//!
//! Produced so the catalog document can still degrade to a readable plain
//! document when the dedicated catalog view is unavailable. The output is
//! ordinary Markdown: a top-level heading, an index linking to each section
//! anchor, the install instructions, then one heading per section.

use crate::parse_catalog;

/// Render the catalog document's source as heading-delimited Markdown.
pub fn render_catalog_markdown(source: &str) -> String {
    let sections = parse_catalog(source);
    if sections.is_empty() {
        return "# DLC\n\n当前版本未解析出 DLC 内容。".to_owned();
    }

    let mut lines: Vec<String> = vec![
        "# DLC".to_owned(),
        String::new(),
        "## 索引".to_owned(),
        String::new(),
    ];
    for section in &sections {
        lines.push(format!("- [{}](#{})", section.title, section.id));
    }

    lines.extend(
        [
            "",
            "## 安装说明",
            "",
            "1. 下载对应 DLC 文件",
            "2. 在 SVC Fusion 的小工具 - DLC 页面上传",
            "3. 点击安装",
            "4. 安装后建议刷新页面",
            "",
        ]
        .map(str::to_owned),
    );

    for section in &sections {
        lines.push(format!("## {}", section.title));
        lines.push(String::new());
        if let Some(note) = &section.note {
            lines.push(format!("> {note}"));
            lines.push(String::new());
        }

        for item in &section.items {
            lines.push(format!("### {}", item.title));
            if let Some(description) = &item.description {
                lines.push(description.clone());
            }
            let mut links = Vec::new();
            if let Some(link) = &item.netdisk_link {
                links.push(format!("[网盘]({link})"));
            }
            if let Some(link) = &item.primary_link {
                links.push(format!("[HuggingFace]({link})"));
            }
            if let Some(link) = &item.mirror_link {
                links.push(format!("[镜像]({link})"));
            }
            if !links.is_empty() {
                lines.push(format!("- {}", links.join(" | ")));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}
