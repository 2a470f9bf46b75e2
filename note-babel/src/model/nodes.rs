//! Core data structures for the note document tree.
//!
//! The tree follows the Slate convention: text leaves carry their marks as
//! boolean flags, elements carry a `type` and `children`. Both serialize to
//! the same JSON shape the editor stores.

use serde::{Deserialize, Serialize};

/// A node of the document tree: either an element or a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

/// A text leaf with its formatting marks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

/// Formatting flags carried by a text leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub superscript: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub subscript: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inserted: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single formatting mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
    Deleted,
    Inserted,
}

impl Mark {
    /// Every mark, in the fixed order serializers apply them (innermost first).
    pub const ALL: [Mark; 9] = [
        Mark::Code,
        Mark::Bold,
        Mark::Italic,
        Mark::Superscript,
        Mark::Subscript,
        Mark::Underline,
        Mark::Strikethrough,
        Mark::Deleted,
        Mark::Inserted,
    ];
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Code => self.code,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Superscript => self.superscript,
            Mark::Subscript => self.subscript,
            Mark::Deleted => self.deleted,
            Mark::Inserted => self.inserted,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        let flag = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Code => &mut self.code,
            Mark::Underline => &mut self.underline,
            Mark::Strikethrough => &mut self.strikethrough,
            Mark::Superscript => &mut self.superscript,
            Mark::Subscript => &mut self.subscript,
            Mark::Deleted => &mut self.deleted,
            Mark::Inserted => &mut self.inserted,
        };
        *flag = on;
    }

    /// Returns a copy with `mark` switched on.
    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    /// Marks set in either operand.
    pub fn union(self, other: Marks) -> Self {
        let mut merged = self;
        for mark in Mark::ALL {
            if other.has(mark) {
                merged.set(mark, true);
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        Mark::ALL.iter().all(|mark| !self.has(*mark))
    }
}

/// The element vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    Quote,
    Code,
    BulletedList,
    NumberedList,
    TaskList,
    SequenceList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Image,
    Link,
    ThematicBreak,
}

impl ElementType {
    /// Inline elements live among text leaves.
    pub fn is_inline(self) -> bool {
        matches!(self, ElementType::Link)
    }

    /// Void elements have no meaningful content.
    pub fn is_void(self) -> bool {
        matches!(self, ElementType::ThematicBreak)
    }

    pub fn is_list(self) -> bool {
        self.list_shape().is_some()
    }

    pub fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    pub fn heading_level(self) -> Option<u8> {
        match self {
            ElementType::HeadingOne => Some(1),
            ElementType::HeadingTwo => Some(2),
            ElementType::HeadingThree => Some(3),
            _ => None,
        }
    }

    /// Heading depths beyond three collapse into `heading-three`.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => ElementType::HeadingOne,
            2 => ElementType::HeadingTwo,
            _ => ElementType::HeadingThree,
        }
    }

    pub fn list_shape(self) -> Option<ListShape> {
        match self {
            ElementType::BulletedList => Some(ListShape::new(false, false)),
            ElementType::NumberedList => Some(ListShape::new(true, false)),
            ElementType::TaskList => Some(ListShape::new(false, true)),
            ElementType::SequenceList => Some(ListShape::new(true, true)),
            _ => None,
        }
    }

    /// Containers whose children are restricted to one element type.
    pub fn is_structural_container(self) -> bool {
        self.is_list() || matches!(self, ElementType::Table | ElementType::TableRow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Paragraph => "paragraph",
            ElementType::HeadingOne => "heading-one",
            ElementType::HeadingTwo => "heading-two",
            ElementType::HeadingThree => "heading-three",
            ElementType::Quote => "quote",
            ElementType::Code => "code",
            ElementType::BulletedList => "bulleted-list",
            ElementType::NumberedList => "numbered-list",
            ElementType::TaskList => "task-list",
            ElementType::SequenceList => "sequence-list",
            ElementType::ListItem => "list-item",
            ElementType::Table => "table",
            ElementType::TableRow => "table-row",
            ElementType::TableCell => "table-cell",
            ElementType::Image => "image",
            ElementType::Link => "link",
            ElementType::ThematicBreak => "thematic-break",
        }
    }
}

/// The shape of a list container, decided once per list node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListShape {
    pub ordered: bool,
    pub checklist: bool,
}

impl ListShape {
    pub fn new(ordered: bool, checklist: bool) -> Self {
        Self { ordered, checklist }
    }

    pub fn element_type(self) -> ElementType {
        match (self.ordered, self.checklist) {
            (false, false) => ElementType::BulletedList,
            (true, false) => ElementType::NumberedList,
            (false, true) => ElementType::TaskList,
            (true, true) => ElementType::SequenceList,
        }
    }
}

/// An element node. `kind` is `None` for untyped wrappers produced while
/// parsing; the normalizer assigns them a type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementType>,
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(
        rename = "noteSubtype",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub note_subtype: Option<String>,
}

impl Element {
    pub fn new(kind: ElementType, children: Vec<Node>) -> Self {
        Self {
            kind: Some(kind),
            children,
            ..Default::default()
        }
    }

    pub fn untyped(children: Vec<Node>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn with_checked(mut self, checked: Option<bool>) -> Self {
        self.checked = checked;
        self
    }

    pub fn is(&self, kind: ElementType) -> bool {
        self.kind == Some(kind)
    }

    pub fn is_inline(&self) -> bool {
        self.kind.is_some_and(ElementType::is_inline)
    }

    pub fn is_list(&self) -> bool {
        self.kind.is_some_and(ElementType::is_list)
    }

    /// A table row is a header row when the leading text of its last cell is bold.
    pub fn is_header_row(&self) -> bool {
        self.is(ElementType::TableRow)
            && self
                .children
                .last()
                .and_then(Node::first_text)
                .is_some_and(|text| text.marks.bold)
    }

    /// Concatenated text of all descendant leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(Text::marked(text, marks))
    }

    pub fn element(kind: ElementType, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    /// A paragraph holding a single plain text leaf.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element(ElementType::Paragraph, vec![Node::text(text)])
    }

    /// An element of `kind` holding one empty text leaf.
    pub fn empty(kind: ElementType) -> Self {
        Node::element(kind, vec![Node::text("")])
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn kind(&self) -> Option<ElementType> {
        self.as_element().and_then(|element| element.kind)
    }

    pub fn is_kind(&self, kind: ElementType) -> bool {
        self.kind() == Some(kind)
    }

    /// Text leaves and inline elements.
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Element(element) => element.is_inline(),
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    /// True when the node shows no visible text. Images and thematic breaks
    /// are always visible.
    pub fn is_blank(&self) -> bool {
        match self {
            Node::Text(text) => text.text.trim().is_empty(),
            Node::Element(element) => match element.kind {
                Some(ElementType::Image) | Some(ElementType::ThematicBreak) => false,
                _ => element.children.iter().all(Node::is_blank),
            },
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// The first text leaf in document order.
    pub fn first_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(element) => element.children.iter().find_map(Node::first_text),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    /// Applies `marks` to every text leaf below this node.
    pub fn add_marks(&mut self, marks: Marks) {
        match self {
            Node::Text(text) => text.marks = text.marks.union(marks),
            Node::Element(element) => {
                for child in &mut element.children {
                    child.add_marks(marks);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}
