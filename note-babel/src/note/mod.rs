//! Note records
//!
//! A [`Note`] is a tree plus the metadata the store keeps. Its subtype lives on the first root
//! node (`noteSubtype`) and decides how the content is written: `html*` notes as HTML,
//! `markdown*` notes as Markdown, everything else as plain text lines.
//!
//! [`serialize_note`] produces the [`SerializedNote`] record handed to the store, with the
//! derived title and search keywords. [`deserialize_note`] is the way back, dispatching on the
//! record's MIME type.

pub mod keywords;
pub mod title;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FormatError, Severity};
use crate::formats::html::{deserialize_html, serialize_html};
use crate::formats::markdown::{deserialize_markdown, serialize_markdown};
use crate::formats::text::{deserialize_text, serialize_text};
use crate::model::{Node, Substitutions};
use crate::registry::mime_subtype;

pub use keywords::{extract_keywords, parse_words};
pub use title::extract_title;

/// The record persisted by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNote {
    pub id: Uuid,
    /// `"text/" + subtype`, or empty when the note has no subtype
    pub mime_type: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub word_arr: Vec<String>,
}

/// A note being edited: its tree plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub nodes: Vec<Node>,
    pub date: DateTime<Utc>,
    pub is_locked: bool,
}

impl Note {
    /// A new unlocked note with a fresh id, tagging the tree with `subtype`
    pub fn new(mut nodes: Vec<Node>, subtype: Option<&str>, date: DateTime<Utc>) -> Self {
        set_subtype(&mut nodes, subtype);
        Self {
            id: Uuid::new_v4(),
            nodes,
            date,
            is_locked: false,
        }
    }

    /// The subtype tag on the first root node
    pub fn subtype(&self) -> Option<&str> {
        self.nodes
            .first()
            .and_then(Node::as_element)
            .and_then(|element| element.note_subtype.as_deref())
    }
}

fn set_subtype(nodes: &mut [Node], subtype: Option<&str>) {
    if let Some(first) = nodes.first_mut().and_then(Node::as_element_mut) {
        first.note_subtype = subtype.filter(|s| !s.is_empty()).map(str::to_string);
    }
}

/// Serialize a note into the record kept by the store.
///
/// `blob:` images in HTML notes are resolved through `substitutions`.
pub fn serialize_note(
    note: &Note,
    substitutions: &Substitutions,
) -> Result<SerializedNote, FormatError> {
    let subtype = note.subtype().unwrap_or_default();
    if subtype.contains('/') || subtype.chars().any(char::is_whitespace) {
        return Err(FormatError::SerializationError(format!(
            "Invalid note subtype '{subtype}'"
        )));
    }
    let content = if subtype.starts_with("html") {
        serialize_html(&note.nodes, substitutions)
    } else if subtype.starts_with("markdown") {
        serialize_markdown(&note.nodes, false)
    } else {
        serialize_text(&note.nodes)
    };
    let mime_type = if subtype.is_empty() {
        String::new()
    } else {
        format!("text/{subtype}")
    };

    Ok(SerializedNote {
        id: note.id,
        mime_type,
        title: extract_title(&note.nodes),
        content,
        date: note.date,
        is_locked: note.is_locked,
        word_arr: extract_keywords(&note.nodes),
    })
}

/// Load a stored record back into a note, dispatching on its MIME type.
///
/// Types with no text rendering fail with [`FormatError::UnsupportedContent`].
pub fn deserialize_note(
    record: &SerializedNote,
    substitutions: &mut Substitutions,
) -> Result<Note, FormatError> {
    let essence = record
        .mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let (mut nodes, subtype) = if essence.is_empty() {
        (deserialize_text(&record.content), None)
    } else if essence == "application/xhtml+xml" {
        (deserialize_html(&record.content, substitutions), Some("html".to_string()))
    } else if let Some(sub) = mime_subtype(&essence) {
        let raw = record.mime_type.trim()["text/".len()..].to_string();
        let nodes = if sub == "html" {
            deserialize_html(&record.content, substitutions)
        } else if sub == "markdown" || sub == "x-markdown" {
            deserialize_markdown(&record.content)
        } else {
            deserialize_text(&record.content)
        };
        (nodes, Some(raw))
    } else {
        return Err(FormatError::UnsupportedContent {
            user_msg: format!(
                "“{}” is stored as {}, which can't be shown as text",
                record.title, record.mime_type
            ),
            severity: Severity::Warning,
        });
    };

    set_subtype(&mut nodes, subtype.as_deref());
    Ok(Note {
        id: record.id,
        nodes,
        date: record.date,
        is_locked: record.is_locked,
    })
}
