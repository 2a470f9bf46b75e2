//! Document conversion for notes
//!
//!     This crate converts between the note document tree (a Slate-style tree of typed blocks,
//!     inline links and marked text leaves) and the formats notes are stored and exchanged in:
//!     sanitized HTML, CommonMark Markdown with the GitHub extensions, and plain text.
//!
//!     This is a pure lib, that is, it powers the note-cli but is shell agnostic: no code should
//!     suppose a shell environment, be it printing to stdout, reading env vars etc. Persistence
//!     goes through the NoteStore trait the caller provides.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── model                   # Node/mark vocabulary, blob substitutions
//!     ├── normalize               # Structural repair to a fixed point
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     │   └── common              # Block lifting shared by both parsers
//!     ├── note                    # Title, keywords, note records
//!     └── import                  # Splitter, file import, store trait
//!
//! Testing
//!     tests
//!     └── <area>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include
//!     these in the mod.
//!
//! Core Algorithms
//!
//!     Every deserializer produces a raw tree that is then normalized (./normalize/mod.rs): the
//!     normalizer enforces the structural invariants (list items in lists, cells in rows, no
//!     block/inline mixing...) one correction at a time until nothing changes. Serializers can
//!     therefore assume a well-formed tree.
//!
//!     The parsers never fail on input: a malformed fragment degrades to its plain text and is
//!     logged, so one bad node never loses a whole note.
//!
//! Formats
//!
//!     Format specific capabilities are implemented with the Format trait. Formats have a
//!     parse() and/or serialize() method, a name, file extensions and MIME subtypes. See the
//!     trait def [./format.rs]
//!     - Format trait: Uniform interface for all formats (parsing and/or serialization)
//!     - FormatRegistry: Centralized discovery and selection of formats
//!     - Format implementations: html, markdown, text, json and treeviz (inspection only)
//!
//! Library Choices
//!
//!     HTML is parsed with html5ever into an rcdom and serialized back through the same DOM.
//!     Markdown is parsed with comrak. The Markdown writer is our own, since the tree carries
//!     marks and list shapes comrak's AST cannot hold.
//!
pub mod error;
pub mod format;
pub mod formats;
pub mod import;
pub mod model;
pub mod normalize;
pub mod note;
pub mod registry;

pub use error::{FormatError, ImportError, Severity, StoreError};
pub use format::Format;
pub use formats::html::{deserialize_html, serialize_html};
pub use formats::markdown::{deserialize_markdown, serialize_markdown, MarkdownOptions};
pub use import::{import_files, split_into_notes, ImportFile, MemoryStore, NoteStore, SplitRules};
pub use model::{Element, ElementType, Mark, Marks, Node, Substitutions, Text};
pub use normalize::{is_normalized, normalize};
pub use note::{deserialize_note, serialize_note, Note, SerializedNote};
pub use registry::FormatRegistry;
