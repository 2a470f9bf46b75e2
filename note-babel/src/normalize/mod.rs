//! Structural normalization of the document tree
//!
//!     Every deserializer output and every edit passes through here. The tree is repaired by a
//!     fixed-point loop: each step looks for the first violation of one rule class, performs
//!     exactly one correction and reports [`NormalizeStep::Retry`]. The loop ends when a full
//!     sweep over every rule finds nothing to do.
//!
//!     Rules are checked in a fixed priority order (see [`Rule::ORDER`]), so for example a stray
//!     list item is wrapped into a list before the mixed block/inline check looks at the same
//!     parent. Each correction strictly reduces the number of violating nodes, which bounds the
//!     loop by the size of the tree.
//!
//!     Invariants maintained:
//!         - the root is never empty
//!         - list items only live directly in list containers, and list containers only hold items
//!         - table cells only live in rows, rows only in tables, rows are padded to equal width
//!         - blocks and inlines never mix as siblings; the root holds blocks only
//!         - paragraphs and headings hold inline content only
//!         - inline elements never hold blocks, and blank inline elements are dropped
//!         - every element has a type
//!         - the note subtype tag sits on the first root node
//!
//!     Afterwards the default structural cleanup runs as further rules: empty containers are
//!     removed, empty elements receive an empty text leaf, adjacent text leaves with the same
//!     marks merge and stray empty leaves disappear.

use crate::model::{Element, ElementType, Mark, Marks, Node, Text};
use crate::formats::common::lift_blocks;
use tracing::{debug, error};

/// A class of structural repair, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    RootNotEmpty,
    StrayListItem,
    ListChild,
    TableStructure,
    TableWidth,
    TextBlockWithBlocks,
    MixedChildren,
    InlineWithBlocks,
    BlankInline,
    UntypedElement,
    SubtypeOnFirstNode,
    EmptyContainer,
    EmptyElement,
    MergeText,
    EmptyText,
}

impl Rule {
    pub const ORDER: [Rule; 15] = [
        Rule::RootNotEmpty,
        Rule::StrayListItem,
        Rule::ListChild,
        Rule::TableStructure,
        Rule::TableWidth,
        Rule::TextBlockWithBlocks,
        Rule::MixedChildren,
        Rule::InlineWithBlocks,
        Rule::BlankInline,
        Rule::UntypedElement,
        Rule::SubtypeOnFirstNode,
        Rule::EmptyContainer,
        Rule::EmptyElement,
        Rule::MergeText,
        Rule::EmptyText,
    ];
}

/// Outcome of a single normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeStep {
    /// One correction was applied; the caller must run another step.
    Retry(Rule),
    /// Nothing to correct.
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Root,
    Element(Option<ElementType>),
}

impl Parent {
    fn kind(self) -> Option<ElementType> {
        match self {
            Parent::Root => None,
            Parent::Element(kind) => kind,
        }
    }

    fn is(self, kind: ElementType) -> bool {
        self.kind() == Some(kind)
    }

    fn is_list(self) -> bool {
        self.kind().is_some_and(ElementType::is_list)
    }

    fn is_inline(self) -> bool {
        self.kind().is_some_and(ElementType::is_inline)
    }

    fn is_text_block(self) -> bool {
        self.kind().is_some_and(is_text_block)
    }

    /// Block type used to wrap stray inline content under this parent.
    fn wrapper(self) -> ElementType {
        match self.kind() {
            Some(kind) if kind.is_list() => ElementType::ListItem,
            Some(ElementType::Table) => ElementType::TableRow,
            Some(ElementType::TableRow) => ElementType::TableCell,
            _ => ElementType::Paragraph,
        }
    }
}

/// Normalize the tree in place until it reaches a fixed point.
///
/// Returns the number of corrections applied; zero means the tree was
/// already normalized.
pub fn normalize(nodes: &mut Vec<Node>) -> usize {
    let budget = 64 + 16 * count_nodes(nodes);
    let mut fixes = 0;
    while let NormalizeStep::Retry(rule) = normalize_step(nodes) {
        fixes += 1;
        if fixes >= budget {
            error!(?rule, fixes, "normalization did not converge; giving up");
            break;
        }
    }
    fixes
}

/// Apply at most one correction anywhere in the tree.
pub fn normalize_step(nodes: &mut Vec<Node>) -> NormalizeStep {
    for rule in Rule::ORDER {
        let fixed = if rule == Rule::SubtypeOnFirstNode {
            fix_subtype(nodes)
        } else {
            fix_tree(rule, Parent::Root, nodes)
        };
        if fixed {
            debug!(?rule, "normalized");
            return NormalizeStep::Retry(rule);
        }
    }
    NormalizeStep::Clean
}

/// Apply at most one correction to the children of the node at `path`
/// (the root when `path` is empty).
///
/// This is the per-mutation entry point: an editor calls it for the node it
/// just changed and repeats while it returns [`NormalizeStep::Retry`].
pub fn normalize_node(nodes: &mut Vec<Node>, path: &[usize]) -> NormalizeStep {
    let Some((parent, children)) = container_at(nodes, path) else {
        return NormalizeStep::Clean;
    };
    for rule in Rule::ORDER {
        let fixed = match rule {
            Rule::SubtypeOnFirstNode if parent == Parent::Root => fix_subtype(children),
            Rule::SubtypeOnFirstNode => false,
            _ => fix_container(rule, parent, children),
        };
        if fixed {
            debug!(?rule, ?path, "normalized node");
            return NormalizeStep::Retry(rule);
        }
    }
    NormalizeStep::Clean
}

/// True when no rule finds anything to correct.
pub fn is_normalized(nodes: &[Node]) -> bool {
    let mut copy = nodes.to_vec();
    normalize_step(&mut copy) == NormalizeStep::Clean
}

fn container_at<'a>(
    nodes: &'a mut Vec<Node>,
    path: &[usize],
) -> Option<(Parent, &'a mut Vec<Node>)> {
    let Some((first, rest)) = path.split_first() else {
        return Some((Parent::Root, nodes));
    };
    let mut element = nodes.get_mut(*first)?.as_element_mut()?;
    for index in rest {
        element = element.children.get_mut(*index)?.as_element_mut()?;
    }
    Some((Parent::Element(element.kind), &mut element.children))
}

fn count_nodes(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(node.children()))
        .sum()
}

fn fix_tree(rule: Rule, parent: Parent, children: &mut Vec<Node>) -> bool {
    if fix_container(rule, parent, children) {
        return true;
    }
    for child in children.iter_mut() {
        if let Node::Element(element) = child {
            if fix_tree(rule, Parent::Element(element.kind), &mut element.children) {
                return true;
            }
        }
    }
    false
}

fn fix_container(rule: Rule, parent: Parent, children: &mut Vec<Node>) -> bool {
    match rule {
        Rule::RootNotEmpty => fix_root_not_empty(parent, children),
        Rule::StrayListItem => fix_stray_list_item(parent, children),
        Rule::ListChild => fix_list_child(parent, children),
        Rule::TableStructure => fix_table_structure(parent, children),
        Rule::TableWidth => fix_table_width(parent, children),
        Rule::TextBlockWithBlocks => fix_text_block_with_blocks(children),
        Rule::MixedChildren => fix_mixed_children(parent, children),
        Rule::InlineWithBlocks => fix_inline_with_blocks(children),
        Rule::BlankInline => fix_blank_inline(children),
        Rule::UntypedElement => fix_untyped(children),
        Rule::SubtypeOnFirstNode => false,
        Rule::EmptyContainer => fix_empty_container(children),
        Rule::EmptyElement => fix_empty_element(children),
        Rule::MergeText => fix_merge_text(children),
        Rule::EmptyText => fix_empty_text(children),
    }
}

fn fix_root_not_empty(parent: Parent, children: &mut Vec<Node>) -> bool {
    if parent == Parent::Root && children.is_empty() {
        children.push(Node::empty(ElementType::Paragraph));
        return true;
    }
    false
}

/// End (exclusive) of the run of adjacent children matching `pred`, starting at `start`.
fn run_end(children: &[Node], start: usize, pred: impl Fn(&Node) -> bool) -> usize {
    let mut end = start;
    while end < children.len() && pred(&children[end]) {
        end += 1;
    }
    end
}

fn wrap_run(children: &mut Vec<Node>, start: usize, end: usize, wrapper: Element) {
    let run: Vec<Node> = children.drain(start..end).collect();
    let mut wrapper = wrapper;
    wrapper.children = run;
    children.insert(start, Node::Element(wrapper));
}

fn wrap_one(children: &mut [Node], index: usize, kind: ElementType) {
    let child = std::mem::replace(&mut children[index], Node::text(""));
    children[index] = Node::element(kind, vec![child]);
}

fn fix_stray_list_item(parent: Parent, children: &mut Vec<Node>) -> bool {
    if parent.is_list() {
        return false;
    }
    let Some(start) = children
        .iter()
        .position(|child| child.is_kind(ElementType::ListItem))
    else {
        return false;
    };
    if children[start].is_blank() {
        children.remove(start);
        return true;
    }
    let end = run_end(children, start, |n| n.is_kind(ElementType::ListItem));
    let checklist = children[start..end]
        .iter()
        .any(|n| n.as_element().is_some_and(|e| e.checked.is_some()));
    let kind = if checklist {
        ElementType::TaskList
    } else {
        ElementType::BulletedList
    };
    wrap_run(children, start, end, Element::new(kind, Vec::new()));
    true
}

fn fix_list_child(parent: Parent, children: &mut Vec<Node>) -> bool {
    if !parent.is_list() {
        return false;
    }
    let Some(index) = children
        .iter()
        .position(|child| !child.is_kind(ElementType::ListItem))
    else {
        return false;
    };
    if children[index].is_blank() {
        children.remove(index);
        return true;
    }
    match &mut children[index] {
        Node::Element(element)
            if element.kind.is_none()
                || element.is(ElementType::Paragraph)
                || element.kind.is_some_and(ElementType::is_heading) =>
        {
            element.kind = Some(ElementType::ListItem);
        }
        _ => wrap_one(children, index, ElementType::ListItem),
    }
    true
}

fn fix_table_structure(parent: Parent, children: &mut Vec<Node>) -> bool {
    for index in 0..children.len() {
        let kind = children[index].kind();
        let violation = match kind {
            Some(ElementType::TableCell) => !parent.is(ElementType::TableRow),
            Some(ElementType::TableRow) => !parent.is(ElementType::Table),
            _ => parent.is(ElementType::Table) || parent.is(ElementType::TableRow),
        };
        if !violation {
            continue;
        }
        if children[index].is_blank() {
            children.remove(index);
            return true;
        }
        match kind {
            Some(ElementType::TableCell) => {
                let end = run_end(children, index, |n| n.is_kind(ElementType::TableCell));
                wrap_run(
                    children,
                    index,
                    end,
                    Element::new(ElementType::TableRow, Vec::new()),
                );
            }
            Some(ElementType::TableRow) => {
                let end = run_end(children, index, |n| n.is_kind(ElementType::TableRow));
                wrap_run(
                    children,
                    index,
                    end,
                    Element::new(ElementType::Table, Vec::new()),
                );
            }
            _ => wrap_one(children, index, parent.wrapper()),
        }
        return true;
    }
    false
}

fn fix_table_width(parent: Parent, children: &mut [Node]) -> bool {
    if !parent.is(ElementType::Table) {
        return false;
    }
    let width = children
        .iter()
        .map(|row| row.children().len())
        .max()
        .unwrap_or(0);
    let mut padded = false;
    for row in children.iter_mut() {
        if let Some(row) = row.as_element_mut() {
            let header = row.is_header_row();
            while row.children.len() < width {
                row.children.push(padding_cell(header));
                padded = true;
            }
        }
    }
    padded
}

/// Header rows are recognized by the bold text of their last cell, so their padding stays bold.
fn padding_cell(header: bool) -> Node {
    if header {
        Node::element(
            ElementType::TableCell,
            vec![Node::marked("", Marks::default().with(Mark::Bold))],
        )
    } else {
        Node::empty(ElementType::TableCell)
    }
}

fn is_text_block(kind: ElementType) -> bool {
    kind == ElementType::Paragraph || kind.is_heading()
}

/// Splits a paragraph or heading holding blocks: inline runs keep its type, the blocks become
/// siblings of the pieces.
fn fix_text_block_with_blocks(children: &mut Vec<Node>) -> bool {
    let Some(index) = children.iter().position(|child| {
        child.as_element().is_some_and(|e| {
            e.kind.is_some_and(is_text_block) && e.children.iter().any(Node::is_block)
        })
    }) else {
        return false;
    };
    let Node::Element(block) = children.remove(index) else {
        return false;
    };
    let mut pieces = lift_blocks(block.kind, block.children);
    if let (Some(subtype), Some(Node::Element(first))) = (block.note_subtype, pieces.first_mut()) {
        first.note_subtype = Some(subtype);
    }
    children.splice(index..index, pieces);
    true
}

fn fix_mixed_children(parent: Parent, children: &mut Vec<Node>) -> bool {
    if parent.is_inline() || parent.is_text_block() {
        return false;
    }
    let has_inline = children.iter().any(Node::is_inline);
    if !has_inline {
        return false;
    }
    let has_block = children.iter().any(Node::is_block);
    if !has_block && parent != Parent::Root {
        return false;
    }
    let Some(start) = children.iter().position(Node::is_inline) else {
        return false;
    };
    if children[start].is_blank() && has_block {
        children.remove(start);
        return true;
    }
    let end = run_end(children, start, Node::is_inline);
    wrap_run(
        children,
        start,
        end,
        Element::new(parent.wrapper(), Vec::new()),
    );
    true
}

fn fix_inline_with_blocks(children: &mut Vec<Node>) -> bool {
    let Some(index) = children.iter().position(|child| {
        child
            .as_element()
            .is_some_and(|e| e.is_inline() && e.children.iter().any(Node::is_block))
    }) else {
        return false;
    };
    let Node::Element(inline) = children.remove(index) else {
        return false;
    };
    let mut hoisted = Vec::new();
    let mut segment = Vec::new();
    let shell = Element {
        children: Vec::new(),
        ..inline.clone()
    };
    for child in inline.children {
        if child.is_block() {
            if !segment.is_empty() {
                let mut piece = shell.clone();
                piece.children = std::mem::take(&mut segment);
                hoisted.push(Node::Element(piece));
            }
            hoisted.push(child);
        } else {
            segment.push(child);
        }
    }
    if !segment.is_empty() {
        let mut piece = shell;
        piece.children = segment;
        hoisted.push(Node::Element(piece));
    }
    children.splice(index..index, hoisted);
    true
}

fn fix_blank_inline(children: &mut Vec<Node>) -> bool {
    if let Some(index) = children
        .iter()
        .position(|child| child.as_element().is_some_and(Element::is_inline) && child.is_blank())
    {
        children.remove(index);
        return true;
    }
    false
}

fn fix_untyped(children: &mut [Node]) -> bool {
    for child in children.iter_mut() {
        if let Node::Element(element) = child {
            if element.kind.is_none() {
                element.kind = Some(ElementType::Paragraph);
                return true;
            }
        }
    }
    false
}

fn fix_subtype(nodes: &mut [Node]) -> bool {
    let Some((first, rest)) = nodes.split_first_mut() else {
        return false;
    };
    let mut displaced = Vec::new();
    if let Node::Element(first) = first {
        for child in &mut first.children {
            take_subtypes(child, &mut displaced);
        }
    }
    for node in rest.iter_mut() {
        take_subtypes(node, &mut displaced);
    }
    if displaced.is_empty() {
        return false;
    }
    if let Node::Element(first) = first {
        if first.note_subtype.is_none() {
            first.note_subtype = displaced.into_iter().next();
        }
    }
    true
}

fn take_subtypes(node: &mut Node, out: &mut Vec<String>) {
    if let Node::Element(element) = node {
        if let Some(subtype) = element.note_subtype.take() {
            out.push(subtype);
        }
        for child in &mut element.children {
            take_subtypes(child, out);
        }
    }
}

fn fix_empty_container(children: &mut Vec<Node>) -> bool {
    if let Some(index) = children.iter().position(|child| {
        child.kind().is_some_and(ElementType::is_structural_container) && child.children().is_empty()
    }) {
        children.remove(index);
        return true;
    }
    false
}

fn fix_empty_element(children: &mut [Node]) -> bool {
    for child in children.iter_mut() {
        if let Node::Element(element) = child {
            let structural = element
                .kind
                .is_some_and(ElementType::is_structural_container);
            if !structural && element.children.is_empty() {
                element.children.push(Node::text(""));
                return true;
            }
        }
    }
    false
}

fn fix_merge_text(children: &mut Vec<Node>) -> bool {
    let mergeable = children.windows(2).any(|pair| match (&pair[0], &pair[1]) {
        (Node::Text(a), Node::Text(b)) => a.marks == b.marks,
        _ => false,
    });
    if !mergeable {
        return false;
    }
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    for child in children.drain(..) {
        match (merged.last_mut(), child) {
            (Some(Node::Text(previous)), Node::Text(next)) if previous.marks == next.marks => {
                previous.text.push_str(&next.text);
            }
            (_, child) => merged.push(child),
        }
    }
    *children = merged;
    true
}

fn fix_empty_text(children: &mut Vec<Node>) -> bool {
    if children.len() < 2 {
        return false;
    }
    if let Some(index) = children
        .iter()
        .position(|child| matches!(child, Node::Text(Text { text, .. }) if text.is_empty()))
    {
        children.remove(index);
        return true;
    }
    false
}
