//! CLI-specific transforms
//!
//! The inspect command shows what the library makes of an input file. Each transform is a
//! stage + format combination:
//!
//! - `tree-json`: the normalized tree as JSON, as the editor stores it
//! - `tree-treeviz`: tree visualization with Unicode icons
//! - `note-json`: the note record (title, keywords, content) the store would receive
//!
//! ## Extra Parameters
//!
//! - `ast-full`: for `tree-treeviz`, list every text leaf with its marks
//!
//! Example: `notes inspect note.md tree-treeviz --extra-ast-full`

use chrono::{DateTime, Utc};
use note_babel::formats::treeviz::to_treeviz_str_with_params;
use note_babel::{serialize_note, FormatRegistry, Note, Substitutions};
use std::collections::HashMap;

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &["tree-json", "tree-treeviz", "note-json"];

/// The note subtype given to content parsed with `format`
pub fn subtype_for_format(format: &str) -> Option<&'static str> {
    match format {
        "html" => Some("html;hint=SEMANTIC"),
        "markdown" => Some("markdown;hint=COMMONMARK"),
        "text" => Some("plain"),
        _ => None,
    }
}

/// Execute a named transform on a source file with optional extra parameters
///
/// `from` names the registered format used to parse `source`; `date` stamps note records.
pub fn execute_transform(
    source: &str,
    from: &str,
    transform_name: &str,
    extra_params: &HashMap<String, String>,
    date: DateTime<Utc>,
) -> Result<String, String> {
    let registry = FormatRegistry::default();
    let nodes = registry
        .parse(source, from)
        .map_err(|e| format!("Transform failed: {e}"))?;

    match transform_name {
        "tree-json" => serde_json::to_string_pretty(&nodes)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        "tree-treeviz" => {
            to_treeviz_str_with_params(&nodes, extra_params).map_err(|e| e.to_string())
        }
        "note-json" => {
            let note = Note::new(nodes, subtype_for_format(from), date);
            let record = serialize_note(&note, &Substitutions::new())
                .map_err(|e| format!("Transform failed: {e}"))?;
            serde_json::to_string_pretty(&record)
                .map_err(|e| format!("JSON serialization failed: {e}"))
        }
        other => Err(format!("Unknown transform: {other}")),
    }
}
