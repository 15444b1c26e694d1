//! Deterministic identifier allocation.
//!
//! Identifiers come from the portal's own `id` attributes whenever present.
//! Missing ids are synthesized from a prefix and a per-prefix counter, and
//! collisions get a numeric suffix, so every identifier in a document is
//! unique and depends only on the input markup.

use std::collections::{HashMap, HashSet};

use crate::markup::Node;

/// Allocates unique identifiers for one document.
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl IdAllocator {
    /// Create an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `candidate`, or the first free `candidate_N` (N ≥ 2).
    ///
    /// # Examples
    /// ```
    /// use legis_harvester::ids::IdAllocator;
    ///
    /// let mut ids = IdAllocator::new();
    /// assert_eq!(ids.claim("art_1"), "art_1");
    /// assert_eq!(ids.claim("art_1"), "art_1_2");
    /// assert_eq!(ids.claim("art_1"), "art_1_3");
    /// ```
    pub fn claim(&mut self, candidate: &str) -> String {
        if self.used.insert(candidate.to_string()) {
            return candidate.to_string();
        }
        let mut n = 2;
        loop {
            let id = format!("{candidate}_{n}");
            if self.used.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }

    /// Synthesize a fresh `{prefix}_{n}` identifier.
    pub fn fresh(&mut self, prefix: &str) -> String {
        loop {
            let counter = self.counters.entry(prefix.to_string()).or_insert(0);
            *counter += 1;
            let id = format!("{prefix}_{counter}");
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Claim the node's `id` attribute, falling back to a synthesized id.
    pub fn for_node(&mut self, node: Option<Node<'_>>, prefix: &str) -> String {
        match node.and_then(|n| n.element_id()) {
            Some(id) => self.claim(id),
            None => self.fresh(prefix),
        }
    }

    /// Claim the first available id among `candidates`, else synthesize one.
    pub fn first_of<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = Option<&'a str>>,
        prefix: &str,
    ) -> String {
        match candidates.into_iter().flatten().find(|id| !id.trim().is_empty()) {
            Some(id) => self.claim(id.trim()),
            None => self.fresh(prefix),
        }
    }
}
