//! Document tree model for notes.
//!
//! This module defines the node/mark vocabulary shared by every format, plus
//! the blob-URL substitution table consulted when saving images.

pub mod nodes;
pub mod substitutions;

pub use nodes::{Element, ElementType, ListShape, Mark, Marks, Node, Text};
pub use substitutions::Substitutions;
