//! Treeviz formatter for note trees
//!
//! Treeviz is a visual representation of the tree, one node per line, with box-drawing
//! connectors encoding the nesting:
//!
//! `<prefix><connector> <icon> <label>` (label truncated to 30 characters)
//!
//! Example:
//!
//! ```text
//! ⧉ Document (2 blocks)
//! ├─ § heading-one: Groceries
//! └─ ☰ task-list (2 items)
//!   ├─ • list-item [x]: eggs
//!   └─ • list-item [ ]: milk
//! ```
//!
//! By default text leaves are folded into their parent's label. With `ast-full` every leaf
//! gets its own line, together with its marks.

use super::icons::get_icon;
use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::model::{Element, Mark, Node, Text};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 30;

fn truncate(label: &str) -> String {
    let flat = label.replace('\n', "↵");
    if flat.chars().count() <= LABEL_WIDTH {
        return flat;
    }
    let mut short: String = flat.chars().take(LABEL_WIDTH - 1).collect();
    short.push('…');
    short
}

fn mark_names(text: &Text) -> Vec<&'static str> {
    Mark::ALL
        .iter()
        .filter(|mark| text.marks.has(**mark))
        .map(|mark| match mark {
            Mark::Code => "code",
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Superscript => "superscript",
            Mark::Subscript => "subscript",
            Mark::Underline => "underline",
            Mark::Strikethrough => "strikethrough",
            Mark::Deleted => "deleted",
            Mark::Inserted => "inserted",
        })
        .collect()
}

fn element_label(element: &Element, include_all: bool) -> String {
    let name = element.kind.map_or("untyped", |kind| kind.as_str());
    let mut label = name.to_string();
    if element.is_list() {
        label.push_str(&format!(" ({} items)", element.children.len()));
    } else if let Some(url) = &element.url {
        label.push_str(&format!(" <{}>", truncate(url)));
    }
    if let Some(checked) = element.checked {
        label.push_str(if checked { " [x]" } else { " [ ]" });
    }
    let folds_text = !include_all && element.children.iter().all(|child| child.as_text().is_some());
    if folds_text {
        let text = element.text_content();
        if !text.is_empty() {
            label.push_str(": ");
            label.push_str(&truncate(&text));
        }
    }
    label
}

fn format_node(
    node: &Node,
    prefix: &str,
    child_index: usize,
    child_count: usize,
    include_all: bool,
) -> String {
    let is_last = child_index + 1 == child_count;
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(node);

    let (label, children): (String, &[Node]) = match node {
        Node::Text(text) => {
            let marks = mark_names(text);
            let mut label = format!("\"{}\"", truncate(&text.text));
            if !marks.is_empty() {
                label.push_str(&format!(" [{}]", marks.join(", ")));
            }
            (label, &[])
        }
        Node::Element(element) => {
            let folds_text =
                !include_all && element.children.iter().all(|child| child.as_text().is_some());
            let children: &[Node] = if folds_text { &[] } else { &element.children };
            (element_label(element, include_all), children)
        }
    };

    let mut output = format!("{prefix}{connector} {icon} {label}\n");
    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    output.push_str(&format_children(children, &child_prefix, include_all));
    output
}

fn format_children(children: &[Node], prefix: &str, include_all: bool) -> String {
    let mut output = String::new();
    for (i, child) in children.iter().enumerate() {
        output.push_str(&format_node(child, prefix, i, children.len(), include_all));
    }
    output
}

pub fn to_treeviz_str(nodes: &[Node]) -> String {
    render(nodes, false)
}

fn render(nodes: &[Node], include_all: bool) -> String {
    let output = format!("⧉ Document ({} blocks)\n", nodes.len());
    output + &format_children(nodes, "", include_all)
}

/// Convert a tree to a treeviz string with optional parameters
///
/// # Parameters
///
/// - `"ast-full"`: when true, every text leaf is listed with its marks instead of being
///   folded into its parent's label.
pub fn to_treeviz_str_with_params(
    nodes: &[Node],
    params: &HashMap<String, String>,
) -> Result<String, FormatError> {
    let include_all = bool_option(params, "ast-full")?.unwrap_or(false);
    Ok(render(nodes, include_all))
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, nodes: &[Node]) -> Result<String, FormatError> {
        Ok(to_treeviz_str(nodes))
    }

    fn serialize_with_options(
        &self,
        nodes: &[Node],
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        to_treeviz_str_with_params(nodes, options)
    }
}
