use chrono::{DateTime, TimeZone, Utc};
use note_babel::{
    deserialize_note, serialize_note, ElementType, FormatError, Node, Note, SerializedNote,
    Severity, Substitutions,
};
use uuid::Uuid;

fn date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
}

fn record(mime_type: &str, content: &str) -> SerializedNote {
    SerializedNote {
        id: Uuid::new_v4(),
        mime_type: mime_type.to_string(),
        title: "Stored".to_string(),
        content: content.to_string(),
        date: date(),
        is_locked: false,
        word_arr: Vec::new(),
    }
}

#[test]
fn test_markdown_note_survives_store_and_load() {
    let nodes = vec![
        Node::element(ElementType::HeadingOne, vec![Node::text("Plan")]),
        Node::paragraph("Ship the caterpillar cat"),
    ];
    let note = Note::new(nodes.clone(), Some("markdown;hint=COMMONMARK"), date());
    let stored = serialize_note(&note, &Substitutions::new()).unwrap();

    assert_eq!(stored.mime_type, "text/markdown;hint=COMMONMARK");
    assert_eq!(stored.title, "Plan");
    assert_eq!(stored.content, "# Plan\n\nShip the caterpillar cat\n");
    assert_eq!(stored.word_arr, vec!["CATERPILLAR", "PLAN", "SHIP"]);

    let loaded = deserialize_note(&stored, &mut Substitutions::new()).unwrap();
    assert_eq!(loaded.id, note.id);
    assert_eq!(loaded.date, note.date);
    assert_eq!(loaded.subtype(), Some("markdown;hint=COMMONMARK"));
    assert_eq!(loaded.nodes[0].text_content(), "Plan");
    assert_eq!(loaded.nodes[1..], nodes[1..]);
}

#[test]
fn test_record_json_shape() {
    let note = Note::new(vec![Node::paragraph("hello")], Some("html"), date());
    let stored = serialize_note(&note, &Substitutions::new()).unwrap();
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["mimeType"], "text/html");
    assert_eq!(json["isLocked"], false);
    assert_eq!(json["wordArr"][0], "HELLO");
    assert_eq!(json["content"], "<p>hello</p>");
}

#[test]
fn test_load_dispatches_on_mime_type() {
    let mut subs = Substitutions::new();

    let html = deserialize_note(&record("application/xhtml+xml", "<p>x</p>"), &mut subs).unwrap();
    assert_eq!(html.subtype(), Some("html"));

    let plain = deserialize_note(&record("text/csv", "a,b\nc,d"), &mut subs).unwrap();
    assert_eq!(plain.subtype(), Some("csv"));
    assert_eq!(plain.nodes.len(), 2);

    let untyped = deserialize_note(&record("", "just text"), &mut subs).unwrap();
    assert_eq!(untyped.subtype(), None);
    assert_eq!(untyped.nodes, vec![Node::paragraph("just text")]);
}

#[test]
fn test_load_rejects_binary_types() {
    let err = deserialize_note(&record("image/png", ""), &mut Substitutions::new()).unwrap_err();
    assert_eq!(err.severity(), Severity::Warning);
    assert!(matches!(err, FormatError::UnsupportedContent { .. }));
    assert!(err.user_msg().unwrap().contains("image/png"));
}

#[test]
fn test_invalid_subtype_rejected() {
    let note = Note::new(vec![Node::paragraph("x")], Some("text/html"), date());
    assert!(matches!(
        serialize_note(&note, &Substitutions::new()),
        Err(FormatError::SerializationError(_))
    ));
}
