//! Common utilities for tree-building formats
//!
//! Both deserializers produce children lists that can mix inline leaves with blocks (an
//! `<img>` inside a `<p>`, an image inside a Markdown paragraph). These helpers separate them
//! before the nodes are attached to a parent.

use crate::model::{Element, ElementType, Node};

/// Wraps every run of inline children that sits among blocks in an element of `wrapper`
/// (untyped when `None`), dropping whitespace-only text at the edges of those runs.
///
/// Children without any block are returned unchanged.
pub fn lift_blocks(wrapper: Option<ElementType>, children: Vec<Node>) -> Vec<Node> {
    if !children.iter().any(Node::is_block) {
        return children;
    }
    let mut out = Vec::with_capacity(children.len());
    let mut run: Vec<Node> = Vec::new();
    for child in children {
        if child.is_block() {
            flush_run(wrapper, &mut run, &mut out);
            out.push(child);
        } else if !(run.is_empty() && is_blank_text(&child)) {
            run.push(child);
        }
    }
    flush_run(wrapper, &mut run, &mut out);
    out
}

/// A paragraph or heading whose children include blocks: inline runs keep `kind`, blocks are
/// lifted beside them.
pub fn split_text_block(kind: ElementType, children: Vec<Node>) -> Vec<Node> {
    if !children.iter().any(Node::is_block) {
        return vec![Node::element(kind, children)];
    }
    lift_blocks(Some(kind), children)
}

fn flush_run(wrapper: Option<ElementType>, run: &mut Vec<Node>, out: &mut Vec<Node>) {
    while run.last().is_some_and(is_blank_text) {
        run.pop();
    }
    if run.is_empty() {
        return;
    }
    let children = std::mem::take(run);
    let element = match wrapper {
        Some(kind) => Element::new(kind, children),
        None => Element::untyped(children),
    };
    out.push(element.into());
}

fn is_blank_text(node: &Node) -> bool {
    matches!(node, Node::Text(_)) && node.is_blank()
}
