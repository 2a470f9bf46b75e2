use chrono::{DateTime, TimeZone, Utc};
use note_babel::import::{split_into_notes, ParseType, SplitRules, TOO_LONG_MESSAGE};
use note_babel::{ImportError, MemoryStore, NoteStore, SerializedNote, StoreError};
use uuid::Uuid;

const FILE_DATE: i64 = 1_700_000_000_000;

fn split(text: &str, parse_type: ParseType) -> (Vec<SerializedNote>, Vec<String>) {
    let mut store = MemoryStore::new();
    let summary = split_into_notes(
        text,
        FILE_DATE,
        "",
        parse_type,
        &SplitRules::default(),
        &mut store,
    )
    .unwrap();
    let notes: Vec<_> = store.notes().cloned().collect();
    assert_eq!(
        summary.note_ids,
        notes.iter().map(|note| note.id).collect::<Vec<_>>()
    );
    (notes, summary.messages)
}

/// Accepts a fixed number of notes, then fails.
struct FlakyStore {
    inner: MemoryStore,
    remaining: usize,
}

impl NoteStore for FlakyStore {
    fn upsert_note(&mut self, note: SerializedNote) -> Result<Uuid, StoreError> {
        if self.remaining == 0 {
            return Err(StoreError("disk full".to_string()));
        }
        self.remaining -= 1;
        self.inner.upsert_note(note)
    }

    fn get_note(&self, id: &Uuid) -> Option<SerializedNote> {
        self.inner.get_note(id)
    }
}

#[test]
fn test_trailing_dates_split_on_four_blank_lines() {
    let text = "first note\nline two\n\n2021-01-02T03:04:05Z\n\n\n\n\nsecond note\n2022-06-07\n";
    let (notes, messages) = split(text, ParseType::Markdown);

    assert!(messages.is_empty());
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].date, Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap());
    assert_eq!(notes[1].date, Utc.with_ymd_and_hms(2022, 6, 7, 0, 0, 0).unwrap());
    assert!(!notes[0].content.contains("2021"));
    assert!(!notes[1].content.contains("2022"));
    assert_eq!(notes[0].title, "first note\nline two");
    assert_eq!(notes[0].mime_type, "text/markdown;hint=COMMONMARK");
}

#[test]
fn test_one_or_two_blank_lines_do_not_split() {
    let (notes, _) = split("a1\n\nb2\n\n\nc3", ParseType::PlainText);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "a1\n\nb2\n\n\nc3");
    assert_eq!(notes[0].mime_type, "text/plain");
}

#[test]
fn test_exactly_three_blank_lines_split() {
    let (notes, _) = split("a1\n\n\n\nb2", ParseType::PlainText);
    assert_eq!(notes.len(), 2);
}

#[test]
fn test_dateless_notes_get_decreasing_dates() {
    let (notes, _) = split(
        "one\n\n\n\ntwo\n\n\n\nthree\n\n\n\nfour",
        ParseType::PlainText,
    );
    let dates: Vec<DateTime<Utc>> = notes.iter().map(|note| note.date).collect();
    assert_eq!(dates.len(), 4);
    assert_eq!(dates[0], DateTime::from_timestamp_millis(FILE_DATE).unwrap());
    assert!(dates.windows(2).all(|pair| pair[0] > pair[1]));
}

#[test]
fn test_dated_notes_do_not_consume_fallback_dates() {
    let (notes, _) = split(
        "dated\n2020-01-01\n\n\n\nundated",
        ParseType::PlainText,
    );
    assert_eq!(notes[1].date, DateTime::from_timestamp_millis(FILE_DATE).unwrap());
}

#[test]
fn test_oversized_markdown_chunk_rejected_siblings_kept() {
    let huge = "x".repeat(600_001);
    let text = format!("before\n\n\n\n{huge}\n\n\n\nafter");
    let (notes, messages) = split(&text, ParseType::Markdown);

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].title, "before");
    assert_eq!(notes[1].title, "after");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains(TOO_LONG_MESSAGE));
}

#[test]
fn test_markdown_chunk_at_the_limit_is_accepted() {
    let text = "y".repeat(600_000);
    let (notes, messages) = split(&text, ParseType::Markdown);
    assert_eq!(notes.len(), 1);
    assert!(messages.is_empty());
}

#[test]
fn test_plain_text_has_a_lower_ceiling() {
    let text = "z".repeat(60_001);
    let (notes, messages) = split(&text, ParseType::PlainText);
    assert!(notes.is_empty());
    assert_eq!(messages.len(), 1);
}

#[test]
fn test_coda_appended_to_every_note() {
    let mut store = MemoryStore::new();
    split_into_notes(
        "alpha\n\n\n\nbeta",
        FILE_DATE,
        "journal.txt",
        ParseType::PlainText,
        &SplitRules::default(),
        &mut store,
    )
    .unwrap();
    let contents: Vec<_> = store.notes().map(|note| note.content.clone()).collect();
    assert_eq!(contents, vec!["alpha\n\njournal.txt", "beta\n\njournal.txt"]);
}

#[test]
fn test_store_failure_reports_created_ids() {
    let mut store = FlakyStore {
        inner: MemoryStore::new(),
        remaining: 1,
    };
    let result = split_into_notes(
        "one\n\n\n\ntwo\n\n\n\nthree",
        FILE_DATE,
        "",
        ParseType::PlainText,
        &SplitRules::default(),
        &mut store,
    );
    match result {
        Err(ImportError::Storage { note_ids, message }) => {
            assert_eq!(note_ids.len(), 1);
            assert!(store.inner.get_note(&note_ids[0]).is_some());
            assert!(message.contains("disk full"));
        }
        other => panic!("expected a storage error, got {other:?}"),
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn boundary_needs_three_blank_lines(blank in 0usize..7, pad in "[ \t]{0,3}") {
            let gap: Vec<&str> = std::iter::repeat(pad.as_str()).take(blank).collect();
            let mut lines = vec!["top"];
            lines.extend(gap);
            lines.push("bottom");
            let (notes, _) = split(&lines.join("\n"), ParseType::PlainText);
            prop_assert_eq!(notes.len(), if blank >= 3 { 2 } else { 1 });
        }

        #[test]
        fn fallback_dates_follow_file_order(words in prop::collection::vec("[a-z]{1,8}", 1..8)) {
            let text = words.join("\n\n\n\n");
            let (notes, _) = split(&text, ParseType::PlainText);
            prop_assert_eq!(notes.len(), words.len());
            for (index, note) in notes.iter().enumerate() {
                let expected = DateTime::from_timestamp_millis(FILE_DATE - index as i64).unwrap();
                prop_assert_eq!(note.date, expected);
            }
        }
    }
}
