//! Markup tree adapter over the portal's HTML.
//!
//! Parses raw HTML into a read-only tree and provides the text helpers used
//! by every other stage of the parser.

mod text;
mod tree;

pub use text::{collect_text, decode_entities, node_text, normalize_whitespace};
pub use tree::{Descendants, MarkupTree, Node};
