//! File import
//!
//! [`import_files`] takes files already read into memory and turns them into stored notes:
//! Markdown and plain text files go through the [splitter](splitter), HTML files become a
//! single note each. Files are handled one after another; the `cancel` flag is checked
//! between files.

pub mod splitter;
pub mod store;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ImportError;
use crate::formats::html::deserialize_html;
use crate::model::Substitutions;
use crate::note::{serialize_note, Note};
use crate::registry::mime_subtype;

pub use splitter::{split_into_notes, ParseType, SplitRules, SplitSummary, TOO_LONG_MESSAGE};
pub use store::{MemoryStore, NoteStore};

/// A file picked for import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub name: String,
    /// MIME type reported for the file; may be empty
    pub mime_type: String,
    /// Modification time in milliseconds since the epoch
    pub last_modified: i64,
    pub content: String,
}

/// Outcome of importing a batch of files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub note_ids: Vec<Uuid>,
    pub messages: Vec<String>,
    /// The batch stopped early because `cancel` was set
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Split(ParseType),
    Html,
}

fn classify(file: &ImportFile) -> Option<FileKind> {
    if let Some(subtype) = mime_subtype(&file.mime_type) {
        return Some(match subtype.as_str() {
            "markdown" | "x-markdown" => FileKind::Split(ParseType::Markdown),
            "html" => FileKind::Html,
            _ => FileKind::Split(ParseType::PlainText),
        });
    }
    if !file.mime_type.trim().is_empty() && file.mime_type != "application/octet-stream" {
        return None;
    }
    let extension = Path::new(&file.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)?;
    match extension.as_str() {
        "md" | "markdown" => Some(FileKind::Split(ParseType::Markdown)),
        "html" | "htm" => Some(FileKind::Html),
        "txt" | "text" => Some(FileKind::Split(ParseType::PlainText)),
        _ => None,
    }
}

/// Import files into `store`, in order.
///
/// Unsupported files and oversized chunks produce messages and are skipped. A store failure
/// ends the batch; its message is reported along with the notes already created.
pub fn import_files(
    files: &[ImportFile],
    rules: &SplitRules,
    store: &mut impl NoteStore,
    cancel: &AtomicBool,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for file in files {
        if cancel.load(Ordering::Relaxed) {
            info!(file = %file.name, "import cancelled");
            summary.cancelled = true;
            break;
        }
        let Some(kind) = classify(file) else {
            warn!(file = %file.name, mime = %file.mime_type, "unsupported file type");
            summary.messages.push(format!(
                "{}: unsupported file type {}",
                file.name,
                if file.mime_type.is_empty() {
                    "(unknown)"
                } else {
                    &file.mime_type
                }
            ));
            continue;
        };

        let coda = if rules.append_file_name {
            file.name.as_str()
        } else {
            ""
        };
        let result = match kind {
            FileKind::Split(parse_type) => split_into_notes(
                &file.content,
                file.last_modified,
                coda,
                parse_type,
                rules,
                store,
            ),
            FileKind::Html => import_html(file, store),
        };

        match result {
            Ok(split) => {
                info!(file = %file.name, notes = split.note_ids.len(), "imported");
                summary.note_ids.extend(split.note_ids);
                summary
                    .messages
                    .extend(split.messages.into_iter().map(|m| format!("{}: {m}", file.name)));
            }
            Err(err) => {
                let ImportError::Storage { note_ids, .. } = &err;
                summary.note_ids.extend(note_ids.iter().copied());
                summary.messages.push(format!("{}: {err}", file.name));
                break;
            }
        }
    }

    summary
}

fn import_html(file: &ImportFile, store: &mut impl NoteStore) -> Result<SplitSummary, ImportError> {
    let storage_error = |message: String| ImportError::Storage {
        note_ids: Vec::new(),
        message,
    };
    let mut substitutions = Substitutions::new();
    let nodes = deserialize_html(&file.content, &mut substitutions);
    let date = chrono::DateTime::from_timestamp_millis(file.last_modified).unwrap_or_default();
    let note = Note::new(nodes, Some("html;hint=SEMANTIC"), date);
    let record =
        serialize_note(&note, &substitutions).map_err(|err| storage_error(err.to_string()))?;
    let id = store
        .upsert_note(record)
        .map_err(|err| storage_error(err.to_string()))?;
    Ok(SplitSummary {
        note_ids: vec![id],
        messages: Vec::new(),
    })
}
