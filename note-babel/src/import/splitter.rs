//! Multi-note file splitter
//!
//!     A flat text or Markdown file may hold many notes. Notes are separated by runs of at
//!     least three blank lines; fewer blank lines are spacing inside a note.
//!
//!     Each chunk loses its trailing blank lines. When the last remaining line is an ISO-8601
//!     date, it becomes the note's date and is dropped from the content. Otherwise the note
//!     gets the file's timestamp, decremented by one millisecond after every such note, so
//!     dateless notes keep the file's order when sorted newest first.
//!
//!     Oversized chunks are reported and skipped; the remaining chunks still import. Notes are
//!     stored one at a time, and a store failure stops the split.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ImportError;
use crate::formats::markdown::deserialize_markdown;
use crate::formats::text::deserialize_text;
use crate::model::Substitutions;
use crate::note::{serialize_note, Note};

use super::store::NoteStore;

/// Message for chunks over the length ceiling
pub const TOO_LONG_MESSAGE: &str = "Divide manually before importing";

/// How a chunk of text is parsed into a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseType {
    Markdown,
    PlainText,
}

impl ParseType {
    /// The note subtype given to notes of this type
    pub fn subtype(self) -> &'static str {
        match self {
            ParseType::Markdown => "markdown;hint=COMMONMARK",
            ParseType::PlainText => "plain",
        }
    }
}

/// Thresholds for splitting files into notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRules {
    /// Consecutive blank lines that end a note
    pub blank_lines_between_notes: usize,
    pub max_plain_text_chars: usize,
    pub max_markdown_chars: usize,
    /// Append the file name to every imported note
    pub append_file_name: bool,
}

impl Default for SplitRules {
    fn default() -> Self {
        Self {
            blank_lines_between_notes: 3,
            max_plain_text_chars: 60_000,
            max_markdown_chars: 600_000,
            append_file_name: true,
        }
    }
}

impl SplitRules {
    fn max_chars(&self, parse_type: ParseType) -> usize {
        match parse_type {
            ParseType::Markdown => self.max_markdown_chars,
            ParseType::PlainText => self.max_plain_text_chars,
        }
    }
}

/// Result of splitting one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSummary {
    pub note_ids: Vec<Uuid>,
    /// User-facing messages for skipped chunks
    pub messages: Vec<String>,
}

#[derive(Debug, PartialEq)]
enum ChunkError {
    /// Nothing but blank lines; skipped without telling the user
    AllBlank,
    TooLong { preview: String, chars: usize },
}

/// A chunk ready to be parsed
#[derive(Debug, PartialEq)]
struct Chunk {
    content: String,
    date: Option<DateTime<Utc>>,
}

/// Split `text` into notes and store each one.
///
/// `file_date_value` is the file's modification time in milliseconds since the epoch. `coda`,
/// when non-empty, is appended to every note after a blank line.
pub fn split_into_notes(
    text: &str,
    file_date_value: i64,
    coda: &str,
    parse_type: ParseType,
    rules: &SplitRules,
    store: &mut impl NoteStore,
) -> Result<SplitSummary, ImportError> {
    let mut summary = SplitSummary::default();
    let mut next_default_date = file_date_value;

    for lines in chunk_lines(text, rules.blank_lines_between_notes) {
        let chunk = match lines_to_chunk(&lines, rules.max_chars(parse_type)) {
            Ok(chunk) => chunk,
            Err(ChunkError::AllBlank) => {
                debug!("skipping blank chunk");
                continue;
            }
            Err(ChunkError::TooLong { preview, chars }) => {
                warn!(chars, "chunk over the length ceiling");
                summary
                    .messages
                    .push(format!("“{preview}” is too long. {TOO_LONG_MESSAGE}"));
                continue;
            }
        };

        let date = match chunk.date {
            Some(date) => date,
            None => {
                let date = millis_to_date(next_default_date);
                next_default_date -= 1;
                date
            }
        };

        let mut content = chunk.content;
        if !coda.is_empty() {
            content.push_str("\n\n");
            content.push_str(coda);
        }
        let nodes = match parse_type {
            ParseType::Markdown => deserialize_markdown(&content),
            ParseType::PlainText => deserialize_text(&content),
        };
        let note = Note::new(nodes, Some(parse_type.subtype()), date);

        let record = serialize_note(&note, &Substitutions::new()).map_err(|err| {
            ImportError::Storage {
                note_ids: summary.note_ids.clone(),
                message: err.to_string(),
            }
        })?;
        match store.upsert_note(record) {
            Ok(id) => summary.note_ids.push(id),
            Err(err) => {
                return Err(ImportError::Storage {
                    note_ids: summary.note_ids,
                    message: err.to_string(),
                })
            }
        }
    }

    Ok(summary)
}

fn line_break_regex() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"\r\n|\n|\r").expect("line break pattern is valid"))
}

/// Groups lines into chunks, cutting before a non-blank line that follows `threshold` or more
/// blank lines.
fn chunk_lines(text: &str, threshold: usize) -> Vec<Vec<&str>> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut empty_line_count = 0;

    for line in line_break_regex().split(text) {
        if line.trim().is_empty() {
            empty_line_count += 1;
        } else {
            if empty_line_count >= threshold && !buffer.is_empty() {
                chunks.push(std::mem::take(&mut buffer));
            }
            empty_line_count = 0;
        }
        buffer.push(line);
    }
    if !buffer.is_empty() {
        chunks.push(buffer);
    }
    chunks
}

fn lines_to_chunk(lines: &[&str], max_chars: usize) -> Result<Chunk, ChunkError> {
    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    if end == 0 {
        return Err(ChunkError::AllBlank);
    }
    let mut lines = &lines[..end];

    let date = lines.last().and_then(|line| parse_date(line));
    if date.is_some() {
        lines = &lines[..lines.len() - 1];
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines = &lines[..lines.len() - 1];
        }
    }

    let content = lines.join("\n");
    let chars = content.chars().count();
    if chars > max_chars {
        let preview: String = content
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default()
            .trim()
            .chars()
            .take(40)
            .collect();
        return Err(ChunkError::TooLong { preview, chars });
    }
    Ok(Chunk { content, date })
}

fn date_regex() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?)?\s*(Z|[+-]\d{2}:?\d{2})?$",
        )
        .expect("date pattern is valid")
    })
}

/// Parses an ISO-8601 date line. Values without an offset are read as UTC.
pub fn parse_date(line: &str) -> Option<DateTime<Utc>> {
    let caps = date_regex().captures(line.trim())?;
    let number = |i: usize| -> Option<u32> { caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok()) };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
    let nanos = match caps.get(7) {
        Some(fraction) => {
            let digits = fraction.as_str();
            let value: u32 = digits.parse().ok()?;
            value * 10u32.pow(9 - digits.len() as u32)
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(number(4)?, number(5)?, number(6)?, nanos)?;
    let naive = date.and_time(time);

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => FixedOffset::east_opt(0)?,
        Some(raw) => {
            let sign = if raw.starts_with('-') { -1 } else { 1 };
            let digits: String = raw[1..].chars().filter(char::is_ascii_digit).collect();
            let hours: i32 = digits[..2].parse().ok()?;
            let minutes: i32 = digits[2..].parse().ok()?;
            FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?
        }
    };
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|date| date.with_timezone(&Utc))
}

fn millis_to_date(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| {
        warn!(millis, "file date out of range");
        DateTime::<Utc>::default()
    })
}
