//! Numeric section nesting.
//!
//! Section headings are siblings in the portal markup; their hierarchy is
//! encoded only in dotted numeric titles such as `2.3.1`. [`SectionNester`]
//! reconstructs parent/child links and depth from those titles with an
//! explicit stack of open sections.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseWarning;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMERIC_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)*)\.?(?:\s|$)").expect("valid regex"));

/// Parse the leading dotted numeric pattern of a section title.
///
/// # Examples
/// ```
/// use legis_harvester::nesting::numeric_prefix;
///
/// assert_eq!(numeric_prefix("1.2.3 Dispoziții"), Some(vec!["1", "2", "3"]));
/// assert_eq!(numeric_prefix("2. Reguli"), Some(vec!["2"]));
/// assert_eq!(numeric_prefix("Secțiunea 1"), None);
/// assert_eq!(numeric_prefix("1.2a"), None);
/// ```
pub fn numeric_prefix(title: &str) -> Option<Vec<&str>> {
    let caps = NUMERIC_PREFIX_PATTERN.captures(title)?;
    Some(caps.get(1)?.as_str().split('.').collect())
}

/// Where a section goes in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<K> {
    /// Depth of the section; root sections have level 1.
    pub level: usize,

    /// Key of the parent section, or `None` for a top-level section.
    pub parent: Option<K>,

    /// Set when a numbered section's expected parent was never seen.
    pub anomaly: Option<ParseWarning>,
}

#[derive(Debug, Clone)]
struct OpenSection<K> {
    key: K,
    segments: Option<Vec<String>>,
    level: usize,
    subsection: bool,
}

/// Stack of open sections, keyed by caller-chosen identifiers.
#[derive(Debug, Clone)]
pub struct SectionNester<K> {
    stack: Vec<OpenSection<K>>,
}

impl<K> Default for SectionNester<K> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<K: Clone + PartialEq> SectionNester<K> {
    /// Create an empty nester.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a section by its title.
    ///
    /// A numbered title with `n` segments gets level `n`. Its parent is the
    /// most recent open section numbered with the first `n - 1` segments.
    /// When that section was never seen the section is promoted to top
    /// level with an anomaly, and stays open so its own descendants can
    /// still nest under it. Identical numbers are siblings, never merged.
    /// Titles without a number start a new top-level run at level 1.
    pub fn place(&mut self, key: K, title: &str) -> Placement<K> {
        self.stack.retain(|open| !open.subsection);

        let Some(segments) = numeric_prefix(title) else {
            self.stack.clear();
            self.stack.push(OpenSection {
                key,
                segments: None,
                level: 1,
                subsection: false,
            });
            return Placement {
                level: 1,
                parent: None,
                anomaly: None,
            };
        };

        let level = segments.len();
        while self.stack.last().is_some_and(|open| open.level >= level) {
            self.stack.pop();
        }

        let expected = &segments[..level - 1];
        let parent = self
            .stack
            .last()
            .filter(|open| {
                open.segments
                    .as_deref()
                    .is_some_and(|seen| seen.iter().map(String::as_str).eq(expected.iter().copied()))
            })
            .map(|open| open.key.clone());

        let anomaly = if parent.is_none() && level > 1 {
            let expected_parent = expected.join(".");
            tracing::warn!(
                section = title.trim(),
                expected_parent = %expected_parent,
                "Numbered section has no parent; promoting to top level"
            );
            Some(ParseWarning::AnomalousNesting {
                section: title.trim().to_string(),
                expected_parent,
            })
        } else {
            None
        };

        self.stack.push(OpenSection {
            key,
            segments: Some(segments.iter().map(|s| (*s).to_string()).collect()),
            level,
            subsection: false,
        });

        Placement {
            level,
            parent,
            anomaly,
        }
    }

    /// Place a subsection.
    ///
    /// `enclosing` is the section whose body contains the subsection, if
    /// any; entries opened after it are closed and it becomes the parent.
    /// Otherwise the subsection goes under the innermost open section, and
    /// consecutive subsections are siblings. Without an open section the
    /// subsection is returned as a top-level section.
    pub fn place_subsection(&mut self, key: K, enclosing: Option<&K>) -> Placement<K> {
        match enclosing.and_then(|e| self.stack.iter().position(|open| &open.key == e)) {
            Some(pos) => self.stack.truncate(pos + 1),
            None => {
                while self.stack.last().is_some_and(|open| open.subsection) {
                    self.stack.pop();
                }
            }
        }

        let (parent, level) = match self.stack.last() {
            Some(open) => (Some(open.key.clone()), open.level + 1),
            None => (None, 1),
        };

        self.stack.push(OpenSection {
            key,
            segments: None,
            level,
            subsection: parent.is_some(),
        });

        Placement {
            level,
            parent,
            anomaly: None,
        }
    }

    /// Forget every open section, e.g. when a chapter starts or ends.
    pub fn reset(&mut self) {
        self.stack.clear();
    }
}

/// Nest a flat sequence of section titles.
///
/// Parents are reported as indices into `titles`; anomalies are collected
/// in document order.
///
/// # Examples
/// ```
/// use legis_harvester::nesting::nest_sections;
///
/// let (placements, warnings) = nest_sections(&["1", "1.1", "1.2", "2"]);
/// let levels: Vec<usize> = placements.iter().map(|p| p.level).collect();
/// let parents: Vec<Option<usize>> = placements.iter().map(|p| p.parent).collect();
///
/// assert_eq!(levels, vec![1, 2, 2, 1]);
/// assert_eq!(parents, vec![None, Some(0), Some(0), None]);
/// assert!(warnings.is_empty());
/// ```
pub fn nest_sections(titles: &[&str]) -> (Vec<Placement<usize>>, Vec<ParseWarning>) {
    let mut nester = SectionNester::new();
    let mut warnings = Vec::new();
    let placements = titles
        .iter()
        .enumerate()
        .map(|(index, title)| {
            let placement = nester.place(index, title);
            warnings.extend(placement.anomaly.clone());
            placement
        })
        .collect();
    (placements, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(titles: &[&str]) -> Vec<(usize, Option<usize>)> {
        nest_sections(titles)
            .0
            .into_iter()
            .map(|p| (p.level, p.parent))
            .collect()
    }

    #[test]
    fn test_numeric_prefix_rejects_glued_text() {
        assert_eq!(numeric_prefix("12"), Some(vec!["12"]));
        assert_eq!(numeric_prefix("  3.4\tTitlu"), Some(vec!["3", "4"]));
        assert_eq!(numeric_prefix("1a"), None);
        assert_eq!(numeric_prefix(""), None);
    }

    #[test]
    fn test_deep_nesting() {
        assert_eq!(
            summary(&["1", "1.1", "1.1.1", "1.1.2", "1.2", "2"]),
            vec![
                (1, None),
                (2, Some(0)),
                (3, Some(1)),
                (3, Some(1)),
                (2, Some(0)),
                (1, None),
            ]
        );
    }

    #[test]
    fn test_duplicate_numbers_are_siblings() {
        assert_eq!(
            summary(&["1", "1.1", "1.1"]),
            vec![(1, None), (2, Some(0)), (2, Some(0))]
        );
    }

    #[test]
    fn test_missing_parent_is_promoted_with_warning() {
        let (placements, warnings) = nest_sections(&["1", "2.1", "2.1.1"]);

        assert_eq!(placements[1].level, 2);
        assert_eq!(placements[1].parent, None);
        assert_eq!(placements[2].parent, Some(1));
        assert_eq!(
            warnings,
            vec![ParseWarning::AnomalousNesting {
                section: "2.1".to_string(),
                expected_parent: "2".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_numeric_sections_reset_nesting() {
        assert_eq!(
            summary(&["1", "Secțiunea a 2-a", "1.1"]),
            vec![(1, None), (1, None), (2, None)]
        );
    }

    #[test]
    fn test_subsections_nest_under_innermost_section() {
        let mut nester = SectionNester::new();
        nester.place("s1", "Secțiunea 1");
        let first = nester.place_subsection("ss1", None);
        let second = nester.place_subsection("ss2", None);

        assert_eq!((first.level, first.parent), (2, Some("s1")));
        assert_eq!((second.level, second.parent), (2, Some("s1")));

        let next = nester.place("s2", "Secțiunea 2");
        assert_eq!(next.parent, None);
    }

    #[test]
    fn test_subsection_without_section_is_top_level() {
        let mut nester: SectionNester<u32> = SectionNester::new();
        let placement = nester.place_subsection(7, None);
        assert_eq!((placement.level, placement.parent), (1, None));
    }

    #[test]
    fn test_enclosing_section_takes_later_subsections() {
        let mut nester = SectionNester::new();
        nester.place(0, "1");
        nester.place(1, "1.1");

        // A subsection in the body of 1 after 1.1 belongs to 1
        let inside = nester.place_subsection(2, Some(&0));
        assert_eq!((inside.level, inside.parent), (2, Some(0)));

        // Without an enclosing body it goes under the innermost section
        nester.place(3, "1.2");
        let trailing = nester.place_subsection(4, None);
        assert_eq!((trailing.level, trailing.parent), (3, Some(3)));
    }

    #[test]
    fn test_reset_forgets_open_sections() {
        let mut nester = SectionNester::new();
        nester.place(0, "1");
        assert_eq!(nester.place(1, "1.1").parent, Some(0));

        nester.reset();
        let placement = nester.place(2, "1.2");
        assert_eq!(placement.parent, None);
        assert!(placement.anomaly.is_some());
    }
}
