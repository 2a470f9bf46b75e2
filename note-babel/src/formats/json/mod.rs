//! JSON format
//!
//! The tree in the shape the editor stores: elements as `{"type", "children", ...}` and text
//! leaves as `{"text", "bold": true, ...}`. Parsed trees are normalized.

use crate::error::FormatError;
use crate::format::Format;
use crate::model::Node;
use crate::normalize::normalize;

/// Format implementation for the JSON tree
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Document tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Node>, FormatError> {
        let mut nodes: Vec<Node> = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid document JSON: {e}")))?;
        normalize(&mut nodes);
        Ok(nodes)
    }

    fn serialize(&self, nodes: &[Node]) -> Result<String, FormatError> {
        serde_json::to_string_pretty(nodes)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}
