//! Markdown serialization (note tree → Markdown)
//!
//! A single recursive pass renders each block to lines; containers (quotes, list items) prefix
//! the lines of their children. The serializer keeps the chain of enclosing element types in
//! `hierarchy` so a block can tell whether it sits inside a list item.
//!
//! Text is emitted without escaping. Marks that Markdown lacks (underline, superscript,
//! subscript, deleted, inserted) are written as the HTML tags the parser passes through.

use crate::model::substitutions::is_data_url;
use crate::model::{Element, ElementType, Mark, Node, Text};

/// Fixed bullet written for thematic breaks.
pub const THEMATIC_BREAK: &str = "---------";
/// Text used for a `data:` image with neither alt text nor title.
pub const GRAPHIC_PLACEHOLDER: &str = "«graphic»";
/// Minimum indentation of list item content.
const LIST_INDENT: usize = 4;

/// Marks in nesting order, outermost first. Code is rendered as a span, not a delimiter.
const DELIMITED_MARKS: [Mark; 8] = [
    Mark::Inserted,
    Mark::Deleted,
    Mark::Strikethrough,
    Mark::Underline,
    Mark::Subscript,
    Mark::Superscript,
    Mark::Italic,
    Mark::Bold,
];

/// Options for Markdown serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Write `data:` images as their alt text (or title, or a placeholder)
    pub replace_data_url_images: bool,
}

/// Serialize a note tree to Markdown
pub fn serialize_to_markdown(nodes: &[Node], options: MarkdownOptions) -> String {
    MarkdownSerializer::new(options).serialize(nodes)
}

/// Renders trees to Markdown, tracking the enclosing element types while recursing
#[derive(Debug, Default)]
pub struct MarkdownSerializer {
    options: MarkdownOptions,
    hierarchy: Vec<ElementType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineMode {
    Paragraph,
    Heading,
    TableCell,
}

impl MarkdownSerializer {
    pub fn new(options: MarkdownOptions) -> Self {
        Self {
            options,
            hierarchy: Vec::new(),
        }
    }

    pub fn serialize(&mut self, nodes: &[Node]) -> String {
        self.hierarchy.clear();
        let lines = self.render_blocks(nodes);
        let mut out = lines.join("\n");
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn inside_list_item(&self) -> bool {
        self.hierarchy.contains(&ElementType::ListItem)
    }

    fn render_blocks(&mut self, nodes: &[Node]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut previous: Option<(&Node, bool)> = None;
        for node in nodes {
            let alternate = match previous {
                Some((prev, prev_alternate)) if same_list_family(prev, node) => !prev_alternate,
                _ => false,
            };
            if previous.is_some() && !(node_is_list(node) && self.inside_list_item()) {
                lines.push(String::new());
            }
            lines.extend(self.render_block(node, alternate));
            previous = Some((node, alternate));
        }
        lines
    }

    fn render_block(&mut self, node: &Node, alternate: bool) -> Vec<String> {
        let element = match node {
            Node::Text(_) => {
                return split_lines(
                    &self.render_inline(std::slice::from_ref(node), InlineMode::Paragraph),
                )
            }
            Node::Element(element) => element,
        };
        let Some(kind) = element.kind else {
            return if element.children.iter().all(Node::is_inline) {
                split_lines(&self.render_inline(&element.children, InlineMode::Paragraph))
            } else {
                self.render_blocks(&element.children)
            };
        };
        match kind {
            ElementType::Link => split_lines(&self.render_inline(
                std::slice::from_ref(node),
                InlineMode::Paragraph,
            )),
            ElementType::Paragraph
            | ElementType::ListItem
            | ElementType::TableRow
            | ElementType::TableCell => {
                if element.children.iter().all(Node::is_inline) {
                    split_lines(&self.render_inline(&element.children, InlineMode::Paragraph))
                } else {
                    self.render_blocks(&element.children)
                }
            }
            ElementType::HeadingOne | ElementType::HeadingTwo | ElementType::HeadingThree => {
                let level = kind.heading_level().unwrap_or(1) as usize;
                let text = self.render_inline(&element.children, InlineMode::Heading);
                vec![format!("{} {}", "#".repeat(level), text).trim_end().to_string()]
            }
            ElementType::Quote => {
                self.hierarchy.push(kind);
                let inner = self.render_blocks(&element.children);
                self.hierarchy.pop();
                inner
                    .into_iter()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect()
            }
            ElementType::Code => render_code_block(&element.text_content()),
            ElementType::Image => vec![self.render_image(element)],
            ElementType::ThematicBreak => vec![THEMATIC_BREAK.to_string()],
            ElementType::Table => self.render_table(element),
            _ if kind.is_list() => self.render_list(element, alternate),
            _ => self.render_blocks(&element.children),
        }
    }

    fn render_list(&mut self, list: &Element, alternate: bool) -> Vec<String> {
        let shape = list.kind.and_then(ElementType::list_shape);
        let ordered = shape.is_some_and(|shape| shape.ordered);
        let checklist = shape.is_some_and(|shape| shape.checklist);

        self.hierarchy.push(list.kind.unwrap_or(ElementType::BulletedList));
        let mut lines = Vec::new();
        for (index, item) in list.children.iter().enumerate() {
            let marker = match (ordered, alternate) {
                (true, false) => format!("{}.", index + 1),
                (true, true) => format!("{})", index + 1),
                (false, false) => "*".to_string(),
                (false, true) => "-".to_string(),
            };
            let checkbox = match item.as_element().and_then(|item| item.checked) {
                _ if !checklist => "",
                Some(true) => "[x] ",
                _ => "[ ] ",
            };
            lines.extend(self.render_item(item, &marker, checkbox));
        }
        self.hierarchy.pop();
        lines
    }

    fn render_item(&mut self, item: &Node, marker: &str, checkbox: &str) -> Vec<String> {
        self.hierarchy.push(ElementType::ListItem);
        let content = match item {
            Node::Element(element) if element.children.iter().all(Node::is_inline) => {
                split_lines(&self.render_inline(&element.children, InlineMode::Paragraph))
            }
            Node::Element(element) => self.render_blocks(&element.children),
            Node::Text(_) => split_lines(
                &self.render_inline(std::slice::from_ref(item), InlineMode::Paragraph),
            ),
        };
        self.hierarchy.pop();

        let width = LIST_INDENT.max(marker.chars().count() + 1);
        let indent = " ".repeat(width);
        let mut lines = Vec::with_capacity(content.len().max(1));
        let mut content = content.into_iter();
        let first = content.next().unwrap_or_default();
        lines.push(format!("{marker:<width$}{checkbox}{first}").trim_end().to_string());
        for line in content {
            if line.is_empty() {
                lines.push(line);
            } else {
                lines.push(format!("{indent}{line}"));
            }
        }
        lines
    }

    fn render_table(&mut self, table: &Element) -> Vec<String> {
        self.hierarchy.push(ElementType::Table);
        let mut lines = Vec::new();
        let columns = table.children.first().map_or(0, |row| row.children().len());
        for (index, row) in table.children.iter().enumerate() {
            let header = index == 0 && row.as_element().is_some_and(Element::is_header_row);
            let cells: Vec<String> = row
                .children()
                .iter()
                .map(|cell| self.render_cell(cell, header))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
            if index == 0 {
                let delimiter = vec!["---"; columns.max(1)];
                lines.push(format!("| {} |", delimiter.join(" | ")));
            }
        }
        self.hierarchy.pop();
        lines
    }

    fn render_cell(&mut self, cell: &Node, header: bool) -> String {
        let children = if header {
            strip_bold(cell.children())
        } else {
            cell.children().to_vec()
        };
        if children.iter().all(Node::is_inline) {
            return self.render_inline(&children, InlineMode::TableCell);
        }
        children
            .iter()
            .map(|block| match block.as_element() {
                Some(element) if element.is(ElementType::Image) => self.render_image(element),
                Some(element) if element.children.iter().all(Node::is_inline) => {
                    self.render_inline(&element.children, InlineMode::TableCell)
                }
                _ => self.render_cell(block, false),
            })
            .collect::<Vec<_>>()
            .join("<br>")
    }

    fn render_image(&self, image: &Element) -> String {
        let url = image.url.as_deref().unwrap_or_default();
        let alt = image.text_content();
        if self.options.replace_data_url_images && is_data_url(url) {
            if !alt.trim().is_empty() {
                return alt;
            }
            if let Some(title) = image.title.as_deref().filter(|t| !t.trim().is_empty()) {
                return title.to_string();
            }
            return GRAPHIC_PLACEHOLDER.to_string();
        }
        format!(
            "![{alt}]({}{})",
            link_destination(url),
            link_title(image.title.as_deref())
        )
    }

    fn render_inline(&self, nodes: &[Node], mode: InlineMode) -> String {
        let mut writer = InlineWriter::new(mode);
        for node in nodes {
            self.write_inline(&mut writer, node);
        }
        writer.finish()
    }

    fn write_inline(&self, writer: &mut InlineWriter, node: &Node) {
        match node {
            Node::Text(text) => writer.write_leaf(text),
            Node::Element(element) if element.is(ElementType::Link) => {
                writer.close_all();
                let label = self.render_inline(&element.children, writer.mode);
                let url = element.url.as_deref().unwrap_or_default();
                writer.out.push_str(&format!(
                    "[{label}]({}{})",
                    link_destination(url),
                    link_title(element.title.as_deref())
                ));
            }
            Node::Element(element) if element.is(ElementType::Image) => {
                writer.close_all();
                let image = self.render_image(element);
                writer.out.push_str(&image);
            }
            Node::Element(element) => {
                for child in &element.children {
                    self.write_inline(writer, child);
                }
            }
        }
    }
}

/// Accumulates inline Markdown, keeping a stack of the marks currently open.
struct InlineWriter {
    out: String,
    open: Vec<Mark>,
    mode: InlineMode,
}

impl InlineWriter {
    fn new(mode: InlineMode) -> Self {
        Self {
            out: String::new(),
            open: Vec::new(),
            mode,
        }
    }

    fn write_leaf(&mut self, text: &Text) {
        if text.text.is_empty() {
            return;
        }
        if text.text.trim().is_empty() && !text.marks.code {
            let body = self.body(&text.text);
            self.out.push_str(&body);
            return;
        }

        if let Some(stale) = self.open.iter().position(|mark| !text.marks.has(*mark)) {
            while self.open.len() > stale {
                self.close_top();
            }
        }

        let body_start = text.text.len() - text.text.trim_start().len();
        let (lead, rest) = text.text.split_at(body_start);
        let body_end = rest.trim_end().len();
        let (body, trail) = rest.split_at(body_end);

        self.out.push_str(&self.body(lead));
        for mark in DELIMITED_MARKS {
            if text.marks.has(mark) && !self.open.contains(&mark) {
                self.out.push_str(opening(mark));
                self.open.push(mark);
            }
        }
        if text.marks.code {
            let span = code_span(body);
            let span = if self.mode == InlineMode::TableCell {
                span.replace('|', "\\|")
            } else {
                span
            };
            self.out.push_str(&span);
        } else {
            let body = self.body(body);
            self.out.push_str(&body);
        }
        let trail = self.body(trail);
        self.out.push_str(&trail);
    }

    fn body(&self, raw: &str) -> String {
        match self.mode {
            InlineMode::Paragraph => raw.replace('\n', "  \n"),
            InlineMode::Heading => raw.replace('\n', " "),
            InlineMode::TableCell => raw.replace('|', "\\|").replace('\n', "<br>"),
        }
    }

    /// Closes the innermost mark, keeping trailing whitespace outside the delimiter.
    fn close_top(&mut self) {
        let Some(mark) = self.open.pop() else {
            return;
        };
        let kept = self.out.trim_end().len();
        let whitespace = self.out.split_off(kept);
        self.out.push_str(closing(mark));
        self.out.push_str(&whitespace);
    }

    fn close_all(&mut self) {
        while !self.open.is_empty() {
            self.close_top();
        }
    }

    fn finish(mut self) -> String {
        self.close_all();
        self.out
    }
}

fn opening(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "**",
        Mark::Italic => "*",
        Mark::Strikethrough => "~~",
        Mark::Underline => "<u>",
        Mark::Superscript => "<sup>",
        Mark::Subscript => "<sub>",
        Mark::Deleted => "<del>",
        Mark::Inserted => "<ins>",
        Mark::Code => "`",
    }
}

fn closing(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "**",
        Mark::Italic => "*",
        Mark::Strikethrough => "~~",
        Mark::Underline => "</u>",
        Mark::Superscript => "</sup>",
        Mark::Subscript => "</sub>",
        Mark::Deleted => "</del>",
        Mark::Inserted => "</ins>",
        Mark::Code => "`",
    }
}

/// Inline code: single backticks, double when the content holds a backtick.
fn code_span(content: &str) -> String {
    if !content.contains('`') {
        return format!("`{content}`");
    }
    let padded = content.starts_with('`') || content.ends_with('`');
    if padded {
        format!("`` {content} ``")
    } else {
        format!("``{content}``")
    }
}

fn render_code_block(content: &str) -> Vec<String> {
    let longest_run = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(3.max(longest_run + 1));
    let mut lines = vec![fence.clone()];
    if !content.is_empty() {
        lines.extend(content.split('\n').map(str::to_string));
    }
    lines.push(fence);
    lines
}

fn link_destination(url: &str) -> String {
    let needs_brackets = url.is_empty()
        || url
            .chars()
            .any(|c| c.is_whitespace() || c == '(' || c == ')');
    if needs_brackets {
        format!("<{url}>")
    } else {
        url.to_string()
    }
}

fn link_title(title: Option<&str>) -> String {
    match title.filter(|t| !t.is_empty()) {
        Some(title) => format!(" \"{}\"", title.replace('"', "\\\"")),
        None => String::new(),
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

fn node_is_list(node: &Node) -> bool {
    node.kind().is_some_and(ElementType::is_list)
}

/// Adjacent lists that Markdown would merge: both bulleted or both numbered.
fn same_list_family(previous: &Node, next: &Node) -> bool {
    match (
        previous.kind().and_then(ElementType::list_shape),
        next.kind().and_then(ElementType::list_shape),
    ) {
        (Some(a), Some(b)) => a.ordered == b.ordered,
        _ => false,
    }
}

fn strip_bold(nodes: &[Node]) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => {
                let mut marks = text.marks;
                marks.set(Mark::Bold, false);
                Node::marked(text.text.clone(), marks)
            }
            Node::Element(element) => Node::Element(Element {
                children: strip_bold(&element.children),
                ..element.clone()
            }),
        })
        .collect()
}
