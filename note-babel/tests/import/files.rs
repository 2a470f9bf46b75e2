use std::sync::atomic::AtomicBool;

use note_babel::{import_files, ImportFile, MemoryStore, SplitRules};

fn file(name: &str, mime_type: &str, content: &str) -> ImportFile {
    ImportFile {
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        last_modified: 1_650_000_000_000,
        content: content.to_string(),
    }
}

#[test]
fn test_mixed_batch() {
    let files = vec![
        file("notes.md", "text/markdown", "# One\n\n\n\n# Two"),
        file("page.html", "", "<h1>Page</h1><p>text</p>"),
        file("photo.png", "image/png", ""),
        file("list.txt", "", "only line"),
    ];
    let mut store = MemoryStore::new();
    let summary = import_files(
        &files,
        &SplitRules::default(),
        &mut store,
        &AtomicBool::new(false),
    );

    assert!(!summary.cancelled);
    assert_eq!(summary.note_ids.len(), 4);
    assert_eq!(summary.messages, vec!["photo.png: unsupported file type image/png"]);

    let notes: Vec<_> = store.notes().collect();
    assert_eq!(notes[0].title, "One");
    assert_eq!(notes[0].content, "# One\n\nnotes.md\n");
    assert_eq!(notes[2].mime_type, "text/html;hint=SEMANTIC");
    assert_eq!(notes[2].title, "Page");
    assert_eq!(notes[3].mime_type, "text/plain");
    assert_eq!(notes[3].content, "only line\n\nlist.txt");
}

#[test]
fn test_file_name_not_appended_when_disabled() {
    let rules = SplitRules {
        append_file_name: false,
        ..SplitRules::default()
    };
    let mut store = MemoryStore::new();
    import_files(
        &[file("a.txt", "text/plain", "bare")],
        &rules,
        &mut store,
        &AtomicBool::new(false),
    );
    assert_eq!(store.notes().next().unwrap().content, "bare");
}

#[test]
fn test_cancelled_before_start() {
    let mut store = MemoryStore::new();
    let summary = import_files(
        &[file("a.txt", "text/plain", "never read")],
        &SplitRules::default(),
        &mut store,
        &AtomicBool::new(true),
    );
    assert!(summary.cancelled);
    assert!(summary.note_ids.is_empty());
    assert!(store.is_empty());
}
