//! HTML parsing (HTML → note tree)
//!
//! Parses with html5ever into an RcDom and walks the `<body>` subtree. Formatting tags push onto
//! a mark stack in [`ParseContext`], structural tags map to elements through [`ELEMENT_TAGS`] and
//! everything else is flattened into its parent.
//!
//! A node that cannot be converted (too deep, image without a source, unusable link target)
//! returns [`Degraded`]; the caller substitutes the subtree's visible text, so one malformed
//! fragment never aborts the whole parse.

use crate::formats::common::{lift_blocks, split_text_block};
use crate::model::substitutions::is_blob_url;
use crate::model::{Element, ElementType, ListShape, Mark, Marks, Node};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{Attribute, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::{debug, error};
use url::Url;

/// Deepest element nesting converted before falling back to text.
pub const MAX_DEPTH: usize = 512;

/// Tags that map onto an element type.
pub const ELEMENT_TAGS: &[(&str, ElementType)] = &[
    ("a", ElementType::Link),
    ("h1", ElementType::HeadingOne),
    ("h2", ElementType::HeadingTwo),
    ("h3", ElementType::HeadingThree),
    ("h4", ElementType::HeadingThree),
    ("h5", ElementType::HeadingThree),
    ("h6", ElementType::HeadingThree),
    ("p", ElementType::Paragraph),
    ("ul", ElementType::BulletedList),
    ("ol", ElementType::NumberedList),
    ("li", ElementType::ListItem),
    ("pre", ElementType::Code),
    ("blockquote", ElementType::Quote),
    ("table", ElementType::Table),
    ("tr", ElementType::TableRow),
    ("td", ElementType::TableCell),
    ("th", ElementType::TableCell),
    ("img", ElementType::Image),
    ("hr", ElementType::ThematicBreak),
    ("dt", ElementType::Paragraph),
    ("dd", ElementType::Quote),
];

/// Tags that switch a mark on for their text.
pub const TEXT_TAGS: &[(&str, Mark)] = &[
    ("b", Mark::Bold),
    ("strong", Mark::Bold),
    ("i", Mark::Italic),
    ("em", Mark::Italic),
    ("cite", Mark::Italic),
    ("dfn", Mark::Italic),
    ("code", Mark::Code),
    ("kbd", Mark::Code),
    ("samp", Mark::Code),
    ("tt", Mark::Code),
    ("u", Mark::Underline),
    ("s", Mark::Strikethrough),
    ("strike", Mark::Strikethrough),
    ("sup", Mark::Superscript),
    ("sub", Mark::Subscript),
    ("del", Mark::Deleted),
    ("ins", Mark::Inserted),
];

/// Tags whose content is never note text.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "title", "noscript"];

/// Result of parsing an HTML fragment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedHtml {
    /// Converted nodes, not yet normalized.
    pub nodes: Vec<Node>,
    /// `blob:` image sources seen, in document order.
    pub blob_urls: Vec<String>,
}

/// A subtree that could not be converted, replaced by its visible text.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded {
    pub text: String,
}

impl Degraded {
    fn from_handle(handle: &Handle) -> Self {
        Degraded {
            text: inner_text(handle),
        }
    }
}

/// Bookkeeping threaded through the walk.
#[derive(Debug, Default)]
struct ParseContext {
    marks: Vec<Marks>,
    code_blocks: Vec<usize>,
    checkboxes: Vec<Option<bool>>,
    blob_urls: Vec<String>,
    depth: usize,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    marks: usize,
    code_blocks: usize,
    checkboxes: usize,
    depth: usize,
}

impl ParseContext {
    fn marks(&self) -> Marks {
        self.marks
            .iter()
            .fold(Marks::default(), |acc, marks| acc.union(*marks))
    }

    fn in_code_block(&self) -> bool {
        !self.code_blocks.is_empty()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            marks: self.marks.len(),
            code_blocks: self.code_blocks.len(),
            checkboxes: self.checkboxes.len(),
            depth: self.depth,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.marks.truncate(checkpoint.marks);
        self.code_blocks.truncate(checkpoint.code_blocks);
        self.checkboxes.truncate(checkpoint.checkboxes);
        self.depth = checkpoint.depth;
    }

    fn is_balanced(&self) -> bool {
        self.marks.is_empty() && self.code_blocks.is_empty() && self.checkboxes.is_empty()
    }
}

/// Parse an HTML string into (unnormalized) note nodes.
pub fn parse_from_html(html: &str) -> ParsedHtml {
    let dom = parse_html(html);
    let body = find_body(&dom.document).unwrap_or_else(|| dom.document.clone());

    let mut ctx = ParseContext::default();
    let nodes = lift_blocks(None, convert_children(&body, &mut ctx));

    if !ctx.is_balanced() {
        error!(
            marks = ctx.marks.len(),
            code_blocks = ctx.code_blocks.len(),
            checkboxes = ctx.checkboxes.len(),
            "unbalanced html parse context after traversal"
        );
    }

    ParsedHtml {
        nodes,
        blob_urls: ctx.blob_urls,
    }
}

fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

fn find_body(document: &Handle) -> Option<Handle> {
    let mut queue = vec![document.clone()];
    while let Some(handle) = queue.pop() {
        if let NodeData::Element { name, .. } = &handle.data {
            if name.local.as_ref() == "body" {
                return Some(handle.clone());
            }
        }
        queue.extend(handle.children.borrow().iter().rev().cloned());
    }
    None
}

fn convert_children(handle: &Handle, ctx: &mut ParseContext) -> Vec<Node> {
    let mut out = Vec::new();
    for child in handle.children.borrow().iter() {
        let checkpoint = ctx.checkpoint();
        match convert_node(child, ctx) {
            Ok(nodes) => out.extend(nodes),
            Err(degraded) => {
                ctx.restore(checkpoint);
                debug!(text = %degraded.text, "html fragment degraded to text");
                if !degraded.text.is_empty() {
                    out.push(Node::marked(degraded.text, ctx.marks()));
                }
            }
        }
    }
    out
}

fn convert_node(handle: &Handle, ctx: &mut ParseContext) -> Result<Vec<Node>, Degraded> {
    match &handle.data {
        NodeData::Text { contents } => {
            let raw = contents.borrow();
            let text = if ctx.in_code_block() {
                raw.to_string()
            } else {
                collapse_whitespace(&raw)
            };
            if text.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![Node::marked(text, ctx.marks())])
            }
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            if SKIPPED_TAGS.contains(&tag) {
                return Ok(Vec::new());
            }
            if ctx.depth >= MAX_DEPTH {
                return Err(Degraded::from_handle(handle));
            }
            let attrs = attrs.borrow();
            ctx.depth += 1;
            let converted = convert_element(handle, tag, &attrs, ctx);
            ctx.depth -= 1;
            converted
        }
        NodeData::Document => Ok(convert_children(handle, ctx)),
        _ => Ok(Vec::new()),
    }
}

fn convert_element(
    handle: &Handle,
    tag: &str,
    attrs: &[Attribute],
    ctx: &mut ParseContext,
) -> Result<Vec<Node>, Degraded> {
    match tag {
        "br" => return Ok(vec![Node::marked("\n", ctx.marks())]),
        "input" => {
            let is_checkbox =
                attr(attrs, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
            if is_checkbox {
                if let Some(slot) = ctx.checkboxes.last_mut() {
                    *slot = Some(attr(attrs, "checked").is_some());
                }
            }
            return Ok(Vec::new());
        }
        _ => {}
    }

    if let Some(mark) = text_mark(tag) {
        if mark == Mark::Code && ctx.in_code_block() {
            return Ok(convert_children(handle, ctx));
        }
        ctx.marks.push(Marks::default().with(mark));
        let children = convert_children(handle, ctx);
        ctx.marks.pop();
        return Ok(children);
    }

    let Some(kind) = element_kind(tag) else {
        return Ok(convert_children(handle, ctx));
    };

    let node = match kind {
        ElementType::Image => convert_image(handle, attrs, ctx)?,
        ElementType::Link => return convert_link(handle, attrs, ctx),
        ElementType::ThematicBreak => Node::empty(ElementType::ThematicBreak),
        ElementType::Code => {
            ctx.code_blocks.push(ctx.depth);
            let children = convert_children(handle, ctx);
            ctx.code_blocks.pop();
            let mut leaves = Vec::new();
            flatten_leaves(children, &mut leaves);
            Node::element(ElementType::Code, leaves)
        }
        ElementType::ListItem => {
            ctx.checkboxes.push(None);
            let children = convert_children(handle, ctx);
            let checked = ctx.checkboxes.pop().flatten();
            Element::new(ElementType::ListItem, lift_blocks(None, children))
                .with_checked(checked)
                .into()
        }
        ElementType::BulletedList | ElementType::NumberedList => {
            let children = lift_blocks(None, convert_children(handle, ctx));
            let checklist = children
                .iter()
                .any(|child| child.as_element().is_some_and(|e| e.checked.is_some()));
            let ordered = kind == ElementType::NumberedList;
            Node::element(ListShape::new(ordered, checklist).element_type(), children)
        }
        _ => {
            let bold = matches!(tag, "th" | "dt");
            if bold {
                ctx.marks.push(Marks::default().with(Mark::Bold));
            }
            let mut children = convert_children(handle, ctx);
            if tag == "th" && children.is_empty() {
                children.push(Node::marked("", ctx.marks()));
            }
            if bold {
                ctx.marks.pop();
            }
            if kind == ElementType::Paragraph || kind.is_heading() {
                return Ok(split_text_block(kind, children));
            }
            Node::element(kind, lift_blocks(None, children))
        }
    };
    Ok(vec![node])
}

fn convert_image(
    handle: &Handle,
    attrs: &[Attribute],
    ctx: &mut ParseContext,
) -> Result<Node, Degraded> {
    let src = attr(attrs, "src")
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
        .ok_or_else(|| Degraded::from_handle(handle))?;
    if is_blob_url(&src) {
        ctx.blob_urls.push(src.clone());
    }
    let alt = attr(attrs, "alt").unwrap_or_default();
    Ok(Element::new(ElementType::Image, vec![Node::text(alt)])
        .with_url(src)
        .with_title(attr(attrs, "title"))
        .into())
}

fn convert_link(
    handle: &Handle,
    attrs: &[Attribute],
    ctx: &mut ParseContext,
) -> Result<Vec<Node>, Degraded> {
    let children = convert_children(handle, ctx);
    let Some(href) = attr(attrs, "href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
    else {
        return Ok(children);
    };
    if !is_usable_href(&href) {
        return Err(Degraded::from_handle(handle));
    }
    Ok(vec![Element::new(ElementType::Link, children)
        .with_url(href)
        .with_title(attr(attrs, "title"))
        .into()])
}

fn is_usable_href(href: &str) -> bool {
    match Url::parse(href) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("https://notes.invalid/")
            .and_then(|base| base.join(href))
            .is_ok(),
        Err(_) => false,
    }
}

fn element_kind(tag: &str) -> Option<ElementType> {
    ELEMENT_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, kind)| *kind)
}

fn text_mark(tag: &str) -> Option<Mark> {
    TEXT_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, mark)| *mark)
}

fn attr(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|attr| attr.name.local.as_ref() == name)
        .map(|attr| attr.value.to_string())
}

fn flatten_leaves(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Node::Text(text)),
            Node::Element(element) => flatten_leaves(element.children, out),
        }
    }
}

/// Collapses runs of HTML whitespace to a single space.
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Visible text of a subtree: collapsed text, `<br>` as newlines, image alt text.
fn inner_text(handle: &Handle) -> String {
    let mut out = String::new();
    let mut stack = vec![handle.clone()];
    while let Some(node) = stack.pop() {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&collapse_whitespace(&contents.borrow())),
            NodeData::Element { name, attrs, .. } => match name.local.as_ref() {
                "br" => out.push('\n'),
                "img" => {
                    if let Some(alt) = attr(&attrs.borrow(), "alt") {
                        out.push_str(&alt);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    out
}
