//! Plain-text format
//!
//! Every line of the input becomes a paragraph. Serialization writes the text content of
//! each block on its own line; list items and table rows expand to one line each.

use crate::error::FormatError;
use crate::format::Format;
use crate::model::{ElementType, Node};
use crate::normalize::normalize;

/// Parse plain text into a normalized tree of paragraphs.
pub fn deserialize_text(text: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = text
        .split('\n')
        .map(|line| Node::paragraph(line.strip_suffix('\r').unwrap_or(line)))
        .collect();
    normalize(&mut nodes);
    nodes
}

/// Render a tree as plain text, one line per block.
pub fn serialize_text(nodes: &[Node]) -> String {
    let mut lines = Vec::new();
    collect_lines(nodes, &mut lines);
    lines.join("\n")
}

fn collect_lines(nodes: &[Node], lines: &mut Vec<String>) {
    for node in nodes {
        match node.kind() {
            Some(kind)
                if kind.is_list()
                    || matches!(kind, ElementType::Quote | ElementType::Table)
                    || !node.children().iter().all(Node::is_inline) =>
            {
                collect_lines(node.children(), lines)
            }
            Some(ElementType::TableRow) => lines.push(
                node.children()
                    .iter()
                    .map(Node::text_content)
                    .collect::<Vec<_>>()
                    .join("\t"),
            ),
            Some(ElementType::ThematicBreak) => lines.push(String::new()),
            _ => lines.push(node.text_content()),
        }
    }
}

/// Format implementation for plain text
pub struct TextFormat;

impl Format for TextFormat {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Plain text, one paragraph per line"
    }

    fn file_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn mime_subtypes(&self) -> &[&str] {
        &["plain"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Node>, FormatError> {
        Ok(deserialize_text(source))
    }

    fn serialize(&self, nodes: &[Node]) -> Result<String, FormatError> {
        Ok(serialize_text(nodes))
    }
}
