//! Label classifier for the portal's structural markers.
//!
//! The portal tags structure with class markers on `span` elements
//! (`S_CAP_TTL`, `S_ART`, `S_ALN_BDY`, ...). A [`MarkerRegistry`] maps those
//! markers to a closed set of [`Role`]s; [`classify`] applies it to a node.

mod config;
mod labels;
mod registry;
mod roles;

pub use config::create_portal_registry;
pub use labels::{is_paragraph_number, normalize_label, split_leading_label, strip_article_prefix};
pub use registry::{classify, portal_registry, MarkerRegistry, HISTORY_BLOCK_ID};
pub use roles::{Classified, Part, Role, Scope};
