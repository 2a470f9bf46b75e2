//! Format implementations
//!
//! This module contains all format implementations that convert between
//! the note tree and its text representations.

pub mod common;
pub mod html;
pub mod icons;
pub mod json;
pub mod markdown;
pub mod text;
pub mod treeviz;

pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use markdown::{MarkdownFormat, MarkdownOptions};
pub use text::TextFormat;
pub use treeviz::TreevizFormat;
