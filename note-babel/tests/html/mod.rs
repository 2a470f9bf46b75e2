//! HTML format tests
//!
//! Tests for bidirectional HTML ↔ note tree conversion.

mod export;
mod import;
