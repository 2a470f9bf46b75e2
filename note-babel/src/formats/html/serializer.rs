//! HTML serialization (note tree → HTML)
//!
//! Builds an RcDom fragment and writes it with html5ever's serializer, which takes care of
//! escaping. Pipeline: nodes → RcDom → HTML string.

use crate::formats::html::parser::MAX_DEPTH;
use crate::model::substitutions::is_blob_url;
use crate::model::{Element, ElementType, Mark, Node, Substitutions, Text};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node as DomNode, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{error, warn};

/// Class on list containers holding checkbox items.
pub const TASK_LIST_CLASS: &str = "contains-task-list";
/// Class on list items rendered with a checkbox.
pub const TASK_ITEM_CLASS: &str = "task-list-item";

#[derive(Debug, Clone, Copy, Default)]
struct RenderContext {
    depth: usize,
    in_code_block: bool,
    in_header_cell: bool,
}

impl RenderContext {
    fn nested(self) -> Self {
        RenderContext {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// A node that could not be rendered; its plain text is emitted instead.
#[derive(Debug)]
struct RenderFailure;

/// Serialize a note tree to an HTML fragment.
///
/// `blob:` images are resolved through `substitutions`; an image without a substitution is
/// dropped from the output.
pub fn serialize_to_html(nodes: &[Node], substitutions: &Substitutions) -> String {
    let container = create_element("div", vec![]);
    append_all(&container, nodes, substitutions, RenderContext::default());
    match serialize_children(&container) {
        Ok(html) => html,
        Err(err) => {
            error!(%err, "html serialization failed");
            String::new()
        }
    }
}

fn append_all(parent: &Handle, nodes: &[Node], subs: &Substitutions, ctx: RenderContext) {
    for node in nodes {
        match render_node(node, subs, ctx) {
            Ok(handles) => parent.children.borrow_mut().extend(handles),
            Err(RenderFailure) => {
                warn!(depth = ctx.depth, "node rendered as plain text");
                parent
                    .children
                    .borrow_mut()
                    .push(create_text(&node.text_content()));
            }
        }
    }
}

fn render_node(
    node: &Node,
    subs: &Substitutions,
    ctx: RenderContext,
) -> Result<Vec<Handle>, RenderFailure> {
    if ctx.depth >= MAX_DEPTH {
        return Err(RenderFailure);
    }
    match node {
        Node::Text(text) => Ok(render_text(text, ctx)),
        Node::Element(element) => render_element(element, subs, ctx.nested()),
    }
}

fn render_element(
    element: &Element,
    subs: &Substitutions,
    ctx: RenderContext,
) -> Result<Vec<Handle>, RenderFailure> {
    let Some(kind) = element.kind else {
        let mut handles = Vec::new();
        for child in &element.children {
            handles.extend(render_node(child, subs, ctx)?);
        }
        return Ok(handles);
    };

    let handle = match kind {
        ElementType::Image => match render_image(element, subs) {
            Some(img) => img,
            None => return Ok(Vec::new()),
        },
        ElementType::ThematicBreak => create_element("hr", vec![]),
        ElementType::Code => {
            let pre = create_element("pre", vec![]);
            let code = create_element("code", vec![]);
            let inner = RenderContext {
                in_code_block: true,
                ..ctx
            };
            append_all(&code, &element.children, subs, inner);
            pre.children.borrow_mut().push(code);
            pre
        }
        ElementType::Link => {
            let mut attrs = vec![("href", element.url.as_deref().unwrap_or_default())];
            if let Some(title) = element.title.as_deref() {
                attrs.push(("title", title));
            }
            let anchor = create_element("a", attrs);
            append_all(&anchor, &element.children, subs, ctx);
            anchor
        }
        ElementType::Table => {
            let table = create_element("table", vec![]);
            for (index, row) in element.children.iter().enumerate() {
                let header = index == 0 && row.as_element().is_some_and(Element::is_header_row);
                let row_ctx = RenderContext {
                    in_header_cell: header,
                    ..ctx
                };
                append_all(&table, std::slice::from_ref(row), subs, row_ctx);
            }
            table
        }
        ElementType::TableCell => {
            let tag = if ctx.in_header_cell { "th" } else { "td" };
            let cell = create_element(tag, vec![]);
            append_all(&cell, &element.children, subs, ctx);
            cell
        }
        kind if kind.is_list() => {
            let checklist = kind.list_shape().is_some_and(|shape| shape.checklist);
            let ordered = kind.list_shape().is_some_and(|shape| shape.ordered);
            let tag = if ordered { "ol" } else { "ul" };
            let attrs = if checklist {
                vec![("class", TASK_LIST_CLASS)]
            } else {
                vec![]
            };
            let list = create_element(tag, attrs);
            for item in &element.children {
                match item {
                    Node::Element(item) if checklist && item.is(ElementType::ListItem) => {
                        list.children
                            .borrow_mut()
                            .push(render_task_item(item, subs, ctx));
                    }
                    other => append_all(&list, std::slice::from_ref(other), subs, ctx),
                }
            }
            list
        }
        kind => {
            let element_handle = create_element(block_tag(kind), vec![]);
            let inner = RenderContext {
                in_header_cell: ctx.in_header_cell && kind == ElementType::TableRow,
                ..ctx
            };
            append_all(&element_handle, &element.children, subs, inner);
            element_handle
        }
    };
    Ok(vec![handle])
}

fn render_task_item(item: &Element, subs: &Substitutions, ctx: RenderContext) -> Handle {
    let li = create_element("li", vec![("class", TASK_ITEM_CLASS)]);
    let mut attrs = vec![("type", "checkbox"), ("disabled", "")];
    if item.checked == Some(true) {
        attrs.push(("checked", ""));
    }
    li.children.borrow_mut().push(create_element("input", attrs));
    append_all(&li, &item.children, subs, ctx.nested());
    li
}

fn render_image(element: &Element, subs: &Substitutions) -> Option<Handle> {
    let url = element.url.as_deref().unwrap_or_default();
    let src = if is_blob_url(url) {
        match subs.resolve(url) {
            Some(data_url) => data_url,
            None => {
                warn!(url, "no substitution for blob image; dropping it");
                return None;
            }
        }
    } else {
        url
    };
    let alt = element.text_content();
    let mut attrs = vec![("src", src), ("alt", alt.as_str())];
    if let Some(title) = element.title.as_deref() {
        attrs.push(("title", title));
    }
    Some(create_element("img", attrs))
}

fn block_tag(kind: ElementType) -> &'static str {
    match kind {
        ElementType::HeadingOne => "h1",
        ElementType::HeadingTwo => "h2",
        ElementType::HeadingThree => "h3",
        ElementType::Quote => "blockquote",
        ElementType::ListItem => "li",
        ElementType::TableRow => "tr",
        _ => "p",
    }
}

fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Code => "code",
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Superscript => "sup",
        Mark::Subscript => "sub",
        Mark::Underline => "u",
        Mark::Strikethrough => "s",
        Mark::Deleted => "del",
        Mark::Inserted => "ins",
    }
}

/// Text leaf: newlines become `<br>` outside code blocks, then marks wrap innermost-first.
fn render_text(text: &Text, ctx: RenderContext) -> Vec<Handle> {
    let mut pieces = Vec::new();
    if ctx.in_code_block {
        pieces.push(create_text(&text.text));
    } else {
        for (index, line) in text.text.split('\n').enumerate() {
            if index > 0 {
                pieces.push(create_element("br", vec![]));
            }
            if !line.is_empty() {
                pieces.push(create_text(line));
            }
        }
    }

    for mark in Mark::ALL {
        if !text.marks.has(mark) {
            continue;
        }
        let redundant = (mark == Mark::Code && ctx.in_code_block)
            || (mark == Mark::Bold && ctx.in_header_cell);
        if redundant {
            continue;
        }
        let wrapper = create_element(mark_tag(mark), vec![]);
        wrapper.children.borrow_mut().extend(pieces);
        pieces = vec![wrapper];
    }
    pieces
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize the children of the fragment container to an HTML string
fn serialize_children(container: &Handle) -> Result<String, String> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone())
            .map_err(|e| format!("HTML serialization failed: {e}"))?;
    }

    String::from_utf8(output).map_err(|e| format!("UTF-8 conversion failed: {e}"))
}
