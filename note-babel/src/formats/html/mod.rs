//! HTML format implementation
//!
//! This module implements bidirectional conversion between the note tree and sanitized HTML.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for HTML parsing and serialization:
//! - `html5ever`: Browser-grade HTML5 parser from the Servo project
//! - `markup5ever_rcdom`: Reference-counted DOM tree implementation
//!
//! Input is expected to be sanitized already; the parser still has to survive malformed or
//! unexpected structure, so per-node failures degrade to text instead of aborting.
//!
//! # Element Mapping Table
//!
//! | Note element          | HTML                                                  |
//! |-----------------------|-------------------------------------------------------|
//! | paragraph             | `<p>`                                                 |
//! | heading-one/two/three | `<h1>`/`<h2>`/`<h3>` (h4-h6 import as heading-three)  |
//! | quote                 | `<blockquote>` (`<dd>` imports as quote)              |
//! | code                  | `<pre><code>`                                         |
//! | bulleted/numbered     | `<ul>`/`<ol>`                                         |
//! | task/sequence list    | `<ul>`/`<ol class="contains-task-list">`              |
//! | list-item             | `<li>`, with `<input type="checkbox">` in checklists  |
//! | table/row/cell        | `<table>`/`<tr>`/`<td>`, `<th>` for a bold first row  |
//! | image                 | `<img src alt title>`                                 |
//! | link                  | `<a href title>`                                      |
//! | thematic-break        | `<hr>`                                                |
//!
//! Marks map to `code`, `strong`, `em`, `sup`, `sub`, `u`, `s`, `del`, `ins` (importing also
//! accepts `b`, `i`, `cite`, `dfn`, `kbd`, `samp`, `tt`, `strike`). A newline in text outside
//! code blocks is written as the HTML5 void element `<br>`; both `<br>` and `<br />` read back as
//! a newline. Unknown tags are flattened; `<dt>` imports as a bold paragraph.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::model::{Node, Substitutions};
use crate::normalize::normalize;

/// Parse sanitized HTML into a normalized tree.
///
/// `blob:` image sources are registered in `substitutions` as pending.
pub fn deserialize_html(html: &str, substitutions: &mut Substitutions) -> Vec<Node> {
    let parsed = parser::parse_from_html(html);
    for blob_url in &parsed.blob_urls {
        substitutions.register_blob(blob_url);
    }
    let mut nodes = parsed.nodes;
    normalize(&mut nodes);
    nodes
}

/// Render a tree as an HTML fragment, resolving `blob:` images through `substitutions`.
pub fn serialize_html(nodes: &[Node], substitutions: &Substitutions) -> String {
    serializer::serialize_to_html(nodes, substitutions)
}

/// Format implementation for HTML
#[derive(Debug, Default)]
pub struct HtmlFormat {
    substitutions: Substitutions,
}

impl HtmlFormat {
    /// Create an HTML format that resolves `blob:` images through `substitutions`
    pub fn with_substitutions(substitutions: Substitutions) -> Self {
        Self { substitutions }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Sanitized HTML fragment"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn mime_subtypes(&self) -> &[&str] {
        &["html"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Node>, FormatError> {
        let mut substitutions = self.substitutions.clone();
        Ok(deserialize_html(source, &mut substitutions))
    }

    fn serialize(&self, nodes: &[Node]) -> Result<String, FormatError> {
        Ok(serialize_html(nodes, &self.substitutions))
    }
}
