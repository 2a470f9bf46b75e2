//! Markdown format implementation
//!
//! This module implements bidirectional conversion between the note tree and CommonMark with
//! the GitHub extensions (tables, strikethrough, autolinks, task lists).
//!
//! # Library Choice
//!
//! Parsing uses `comrak`: CommonMark compliant, with the GFM extensions we need. Serialization
//! is hand-written, since the note tree carries marks (underline, superscript, inserted...)
//! and list shapes that have no comrak AST node.
//!
//! # Element Mapping Table
//!
//! | Note element          | Markdown                         | Import notes                         |
//! |-----------------------|----------------------------------|--------------------------------------|
//! | paragraph             | Paragraph                        | Soft and hard breaks become `\n`     |
//! | heading-one/two/three | `#`, `##`, `###`                 | h4-h6 import as heading-three        |
//! | quote                 | `> `                             |                                      |
//! | code                  | Fenced block                     | Info string is dropped               |
//! | bulleted/numbered     | `*` / `1.` (`-` / `1)` if adjacent) | Task markers make task/sequence   |
//! | list-item             | Item, content indented by 4      | A lone paragraph is unwrapped        |
//! | table                 | GFM pipe table                   | Header cells become bold             |
//! | image                 | `![alt](url "title")`            | Empty URL keeps only the alt text    |
//! | link                  | `[text](url "title")`            | Empty URL keeps only the text        |
//! | thematic-break        | `---------`                      |                                      |
//!
//! Marks: `**bold**`, `*italic*`, `` `code` ``, `~~strikethrough~~`. Underline, superscript,
//! subscript, deleted and inserted are written as `<u>`, `<sup>`, `<sub>`, `<del>`, `<ins>`,
//! and those tags are read back as mark toggles.
//!
//! # Lossy Conversions
//!
//! - Text is not escaped on export, so literal `*` or `#` may re-parse as syntax
//! - Code block languages are lost
//! - Alignment of table columns is lost
//! - With `replace-data-url-images`, inline images become text

pub mod parser;
pub mod serializer;

use std::collections::HashMap;

use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::model::Node;
use crate::normalize::normalize;

pub use serializer::MarkdownOptions;

/// Option key for [`MarkdownOptions::replace_data_url_images`]
pub const REPLACE_DATA_URL_IMAGES: &str = "replace-data-url-images";

/// Parse Markdown into a normalized tree.
pub fn deserialize_markdown(markdown: &str) -> Vec<Node> {
    let mut nodes = parser::parse_from_markdown(markdown);
    normalize(&mut nodes);
    nodes
}

/// Render a tree as Markdown.
pub fn serialize_markdown(nodes: &[Node], replace_data_url_images: bool) -> String {
    serializer::serialize_to_markdown(
        nodes,
        MarkdownOptions {
            replace_data_url_images,
        },
    )
}

/// Format implementation for Markdown
#[derive(Debug, Default)]
pub struct MarkdownFormat {
    options: MarkdownOptions,
}

impl MarkdownFormat {
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GitHub extensions"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn mime_subtypes(&self) -> &[&str] {
        &["markdown", "x-markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Node>, FormatError> {
        Ok(deserialize_markdown(source))
    }

    fn serialize(&self, nodes: &[Node]) -> Result<String, FormatError> {
        Ok(serializer::serialize_to_markdown(nodes, self.options))
    }

    fn serialize_with_options(
        &self,
        nodes: &[Node],
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if let Some(unknown) = options.keys().find(|key| *key != REPLACE_DATA_URL_IMAGES) {
            return Err(FormatError::SerializationError(format!(
                "Unknown markdown option '{unknown}'"
            )));
        }
        let mut resolved = self.options;
        if let Some(replace) = bool_option(options, REPLACE_DATA_URL_IMAGES)? {
            resolved.replace_data_url_images = replace;
        }
        Ok(serializer::serialize_to_markdown(nodes, resolved))
    }
}
