//! Markdown format tests
//!
//! Tests for bidirectional Markdown ↔ note tree conversion.

mod export;
mod round_trip;
