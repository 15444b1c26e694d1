//! Registry configuration for the legislatie.just.ro marker dialect.

use super::registry::MarkerRegistry;
use super::roles::{Part, Role, Scope};

/// Container markers: prefix and role. Each has `_TTL`, `_DEN` and `_BDY` parts.
const CONTAINER_MARKERS: &[(&str, Role)] = &[
    ("S_CRT", Role::Book),
    ("S_TTL", Role::Title),
    ("S_CAP", Role::Chapter),
    ("S_SEC", Role::Section),
    ("S_SSEC", Role::SubSection),
    ("S_ANX", Role::Annex),
];

/// Create a marker registry configured for the portal's HTML.
#[must_use]
pub fn create_portal_registry() -> MarkerRegistry {
    let mut registry = MarkerRegistry::new();

    // Hierarchy containers and annexes
    for (prefix, role) in CONTAINER_MARKERS {
        registry.register(format!("{prefix}_TTL"), *role, Part::Heading);
        registry.register(format!("{prefix}_DEN"), *role, Part::Description);
        registry.register(format!("{prefix}_BDY"), *role, Part::Body);
    }
    registry.register("S_ANX", Role::Annex, Part::Whole);

    // Articles
    registry.register("S_ART", Role::Article, Part::Whole);
    registry.register("S_ART_TTL", Role::Article, Part::Heading);
    registry.register("S_ART_BDY", Role::Article, Part::Body);

    // Paragraphs
    registry.register("S_ALN", Role::Paragraph, Part::Whole);
    registry.register("S_ALN_TTL", Role::Paragraph, Part::Heading);
    registry.register("S_ALN_BDY", Role::Paragraph, Part::Body);
    registry.register("S_PAR", Role::Paragraph, Part::Whole);

    // Lettered and numbered items
    for prefix in ["S_LIT", "S_LIN"] {
        registry.register(prefix, Role::SubParagraph, Part::Whole);
        registry.register(format!("{prefix}_TTL"), Role::SubParagraph, Part::Heading);
        registry.register(format!("{prefix}_BDY"), Role::SubParagraph, Part::Body);
        registry.register(format!("{prefix}_SHORT"), Role::NoteShortPlaceholder, Part::Whole);
    }

    // Amendment notes
    registry.register("S_NTA", Role::Note, Part::Whole);
    registry.register("S_NTA_TTL", Role::Note, Part::Heading);
    registry.register("S_NTA_PAR", Role::Note, Part::Body);

    // Inside a paragraph body S_PAR marks the amendment note of that paragraph
    registry.register_scoped(Scope::ParagraphBody, "S_PAR", Role::Note, Part::Whole);

    registry.metadata(["head", "meta", "title", "link"]);
    registry.skip(["script", "style", "noscript", "iframe", "button", "input", "select"]);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_portal_registry() {
        let registry = create_portal_registry();

        // Containers
        assert!(registry.has_marker("S_CRT_TTL"));
        assert!(registry.has_marker("S_SSEC_BDY"));
        assert_eq!(
            registry.lookup("S_SEC_DEN", Scope::Document),
            Some((Role::Section, Part::Description))
        );

        // Articles and items
        assert!(registry.has_marker("S_ART"));
        assert!(registry.has_marker("S_LIN_TTL"));
        assert_eq!(
            registry.lookup("S_LIN_SHORT", Scope::ArticleBody),
            Some((Role::NoteShortPlaceholder, Part::Whole))
        );

        // Skip tags
        assert!(registry.should_skip("script"));
        assert!(!registry.should_skip("span"));
    }
}
