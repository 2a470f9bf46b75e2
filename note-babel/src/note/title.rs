//! Title extraction
//!
//! The title comes from the first non-blank blocks of the best available kind: headings, then
//! paragraphs, then list items and quotes, then table cells and code blocks. Up to two lines are
//! kept; when the first block has a single line the next block of the same kind supplies the
//! second. Paragraphs inside list items count as items.

use crate::model::{ElementType, Node};

const TITLE_LINES: usize = 2;
const BULLET: &str = "• ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Heading,
    Paragraph,
    ItemOrQuote,
    CellOrCode,
}

impl Tier {
    const ORDER: [Tier; 4] = [
        Tier::Heading,
        Tier::Paragraph,
        Tier::ItemOrQuote,
        Tier::CellOrCode,
    ];

    fn accepts(self, kind: ElementType) -> bool {
        match self {
            Tier::Heading => kind.is_heading(),
            Tier::Paragraph => kind == ElementType::Paragraph,
            Tier::ItemOrQuote => matches!(kind, ElementType::ListItem | ElementType::Quote),
            Tier::CellOrCode => matches!(kind, ElementType::TableCell | ElementType::Code),
        }
    }

    fn skips(self, kind: Option<ElementType>) -> bool {
        matches!(self, Tier::Heading | Tier::Paragraph) && kind == Some(ElementType::ListItem)
    }
}

/// Derive a plain-text title from a tree. Returns an empty string when nothing qualifies.
pub fn extract_title(nodes: &[Node]) -> String {
    Tier::ORDER
        .iter()
        .map(|tier| {
            let mut lines = Vec::new();
            collect_lines(nodes, *tier, None, &mut lines);
            lines
        })
        .find(|lines| !lines.is_empty())
        .map(|lines| lines.join("\n"))
        .unwrap_or_default()
}

fn collect_lines(
    nodes: &[Node],
    tier: Tier,
    parent: Option<ElementType>,
    lines: &mut Vec<String>,
) {
    for node in nodes {
        if lines.len() >= TITLE_LINES {
            return;
        }
        let Some(element) = node.as_element() else {
            continue;
        };
        if element.kind.is_some_and(|kind| tier.accepts(kind)) && !node.is_blank() {
            let first = lines.len();
            let text = own_text(node);
            lines.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .take(TITLE_LINES - first)
                    .map(str::to_string),
            );
            if lines.len() > first {
                let bullet =
                    element.is(ElementType::ListItem) && parent.is_some_and(is_unordered);
                if bullet {
                    lines[first].insert_str(0, BULLET);
                }
                continue;
            }
        }
        if !tier.skips(element.kind) {
            collect_lines(&element.children, tier, element.kind, lines);
        }
    }
}

fn is_unordered(list: ElementType) -> bool {
    list.list_shape().is_some_and(|shape| !shape.ordered)
}

/// Text of a block without the text of nested lists.
fn own_text(node: &Node) -> String {
    match node {
        Node::Text(text) => text.text.clone(),
        Node::Element(element) => {
            let inline = element.children.iter().all(Node::is_inline);
            let parts: Vec<String> = element
                .children
                .iter()
                .filter(|child| !child.kind().is_some_and(ElementType::is_list))
                .map(own_text)
                .collect();
            if inline {
                parts.concat()
            } else {
                parts.join("\n")
            }
        }
    }
}
