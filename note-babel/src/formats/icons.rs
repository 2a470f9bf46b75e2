//! Icon mapping for tree visualization
//!
//! Each element type gets a single Unicode character so deep trees stay scannable.

use crate::model::{ElementType, Node};

/// Get the Unicode icon for a node
pub fn get_icon(node: &Node) -> &'static str {
    match node.kind() {
        Some(kind) => element_icon(kind),
        None if node.as_text().is_some() => "◦",
        None => "○",
    }
}

/// Get the Unicode icon for an element type
pub fn element_icon(kind: ElementType) -> &'static str {
    match kind {
        ElementType::Paragraph => "¶",
        ElementType::HeadingOne | ElementType::HeadingTwo | ElementType::HeadingThree => "§",
        ElementType::Quote => "\"",
        ElementType::Code => "𝒱",
        ElementType::BulletedList
        | ElementType::NumberedList
        | ElementType::TaskList
        | ElementType::SequenceList => "☰",
        ElementType::ListItem => "•",
        ElementType::Table => "▦",
        ElementType::TableRow => "═",
        ElementType::TableCell => "▭",
        ElementType::Image => "▣",
        ElementType::Link => "⊕",
        ElementType::ThematicBreak => "⎯",
    }
}
