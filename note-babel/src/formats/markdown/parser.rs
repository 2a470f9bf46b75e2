//! Markdown parsing (Markdown → note tree)
//!
//! Parses CommonMark plus the GFM table, strikethrough, autolink and task-list extensions with
//! comrak, then maps the comrak AST onto note elements.
//! Pipeline: Markdown string → Comrak AST → nodes

use crate::formats::common::{lift_blocks, split_text_block};
use crate::formats::html::parser::parse_from_html;
use crate::model::{Element, ElementType, ListShape, Mark, Marks, Node};
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, Options};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{error, warn};

/// Raw HTML tags passed through as marks rather than handed to the HTML parser.
const PASSTHROUGH_TAGS: &[(&str, Mark)] = &[
    ("u", Mark::Underline),
    ("sup", Mark::Superscript),
    ("sub", Mark::Subscript),
    ("s", Mark::Strikethrough),
    ("del", Mark::Deleted),
    ("ins", Mark::Inserted),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Passthrough {
    Open(Mark),
    Close(Mark),
    Break,
}

/// Parse a Markdown string into (unnormalized) note nodes
pub fn parse_from_markdown(source: &str) -> Vec<Node> {
    warn_duplicate_definitions(source);

    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);

    map_blocks(root)
}

fn default_comrak_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

fn definition_regex() -> &'static Regex {
    static DEFINITION: OnceLock<Regex> = OnceLock::new();
    DEFINITION.get_or_init(|| {
        Regex::new(r"(?m)^ {0,3}\[([^\]\n]+)\]:[ \t]*\S").expect("definition pattern is valid")
    })
}

/// comrak resolves references itself (first definition wins); duplicates are only reported.
fn warn_duplicate_definitions(source: &str) {
    let mut seen = HashSet::new();
    for captures in definition_regex().captures_iter(source) {
        let label = captures[1]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if !seen.insert(label.clone()) {
            warn!(%label, "duplicate link reference definition ignored");
        }
    }
}

fn map_blocks<'a>(parent: &'a AstNode<'a>) -> Vec<Node> {
    let mut out = Vec::new();
    for child in parent.children() {
        out.extend(map_block(child));
    }
    out
}

fn map_block<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Document => map_blocks(node),
        NodeValue::Paragraph => split_text_block(
            ElementType::Paragraph,
            map_inlines(node, Marks::default()),
        ),
        NodeValue::Heading(heading) => split_text_block(
            ElementType::heading(heading.level),
            map_inlines(node, Marks::default()),
        ),
        NodeValue::BlockQuote => vec![Node::element(
            ElementType::Quote,
            lift_blocks(None, map_blocks(node)),
        )],
        NodeValue::List(list) => {
            let checklist = node
                .children()
                .any(|item| matches!(item.data.borrow().value, NodeValue::TaskItem(_)));
            let shape = ListShape::new(list.list_type == ListType::Ordered, checklist);
            let items = node.children().map(map_item).collect();
            vec![Node::element(shape.element_type(), items)]
        }
        NodeValue::Item(_) | NodeValue::TaskItem(_) => vec![map_item(node)],
        NodeValue::CodeBlock(code) => {
            let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
            vec![Node::element(ElementType::Code, vec![Node::text(literal)])]
        }
        NodeValue::HtmlBlock(html) => parse_from_html(&html.literal).nodes,
        NodeValue::ThematicBreak => vec![Node::empty(ElementType::ThematicBreak)],
        NodeValue::Table(_) => vec![Node::element(
            ElementType::Table,
            node.children().flat_map(map_block).collect(),
        )],
        NodeValue::TableRow(header) => {
            let marks = if header {
                Marks::default().with(Mark::Bold)
            } else {
                Marks::default()
            };
            let cells = node
                .children()
                .map(|cell| {
                    let mut children = map_inlines(cell, marks);
                    if header && children.is_empty() {
                        children.push(Node::marked("", marks));
                    }
                    Node::element(ElementType::TableCell, children)
                })
                .collect();
            vec![Node::element(ElementType::TableRow, cells)]
        }
        other => {
            error!(node = ?other, "unsupported markdown block dropped");
            Vec::new()
        }
    }
}

/// List items holding a single paragraph take the paragraph's children directly.
fn map_item<'a>(item: &'a AstNode<'a>) -> Node {
    let checked = match item.data.borrow().value {
        NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
        _ => None,
    };
    let mut children = map_blocks(item);
    if children.len() == 1 && children[0].is_kind(ElementType::Paragraph) {
        if let Some(Node::Element(paragraph)) = children.pop() {
            children = paragraph.children;
        }
    }
    Element::new(ElementType::ListItem, lift_blocks(None, children))
        .with_checked(checked)
        .into()
}

/// Maps the inline children of `parent`. Raw passthrough tags toggle marks for the siblings
/// that follow them, without tracking nesting.
fn map_inlines<'a>(parent: &'a AstNode<'a>, marks: Marks) -> Vec<Node> {
    let mut out = Vec::new();
    let mut toggled = Marks::default();
    for child in parent.children() {
        let value = child.data.borrow().value.clone();
        let active = marks.union(toggled);
        match value {
            NodeValue::Text(text) => out.push(Node::marked(text, active)),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(Node::marked("\n", active)),
            NodeValue::Code(code) => {
                out.push(Node::marked(code.literal, active.with(Mark::Code)));
            }
            NodeValue::Emph => out.extend(map_inlines(child, active.with(Mark::Italic))),
            NodeValue::Strong => out.extend(map_inlines(child, active.with(Mark::Bold))),
            NodeValue::Strikethrough => {
                out.extend(map_inlines(child, active.with(Mark::Strikethrough)));
            }
            NodeValue::Link(link) => {
                let children = map_inlines(child, active);
                if link.url.is_empty() {
                    let text: String = children.iter().map(Node::text_content).collect();
                    out.push(Node::marked(text, active));
                } else {
                    out.push(
                        Element::new(ElementType::Link, children)
                            .with_url(link.url)
                            .with_title(Some(link.title))
                            .into(),
                    );
                }
            }
            NodeValue::Image(link) => {
                let alt = collect_text(child);
                if link.url.is_empty() {
                    if !alt.trim().is_empty() {
                        out.push(Node::marked(alt, active));
                    }
                } else {
                    out.push(
                        Element::new(ElementType::Image, vec![Node::text(alt)])
                            .with_url(link.url)
                            .with_title(Some(link.title))
                            .into(),
                    );
                }
            }
            NodeValue::HtmlInline(raw) => match passthrough(&raw) {
                Some(Passthrough::Open(mark)) => toggled.set(mark, true),
                Some(Passthrough::Close(mark)) => toggled.set(mark, false),
                Some(Passthrough::Break) => out.push(Node::marked("\n", active)),
                None => {
                    for mut node in parse_from_html(&raw).nodes {
                        node.add_marks(active);
                        out.push(node);
                    }
                }
            },
            other => {
                error!(node = ?other, "unsupported markdown inline dropped");
            }
        }
    }
    out
}

fn passthrough(raw: &str) -> Option<Passthrough> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let inner = compact.strip_prefix('<')?.strip_suffix('>')?;
    if matches!(inner, "br" | "br/") {
        return Some(Passthrough::Break);
    }
    let (closing, name) = match inner.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, inner),
    };
    let mark = PASSTHROUGH_TAGS
        .iter()
        .find(|(tag, _)| *tag == name)
        .map(|(_, mark)| *mark)?;
    Some(if closing {
        Passthrough::Close(mark)
    } else {
        Passthrough::Open(mark)
    })
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => text.push_str(&collect_text(child)),
        }
    }
    text
}
