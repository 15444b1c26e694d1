//! Output of parsed documents.
//!
//! This module provides:
//! - JSON and YAML serialization of a parsed document
//! - Portal-style markup rendering of a document model

mod markup;
mod writer;

pub use markup::{escape, render_markup};
pub use writer::{save, to_string, Format};
