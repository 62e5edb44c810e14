//! Property-based tests for proofing-engine

use proofing_engine::languagetool::utf16_to_byte_offset;
use proofing_engine::personalization::filter_issues;
use proofing_engine::{readability, ProofingEngine};
use proptest::prelude::*;
use shared_types::{quality_score, Dictionary, Document};

/// Text seeded with the built-in rule phrases
fn prose() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("thier".to_string()),
            Just("Recieve".to_string()),
            Just("very good".to_string()),
            Just("literally".to_string()),
            Just("happy".to_string()),
            Just("cant".to_string()),
            "[a-zA-Zé ]{1,8}",
            "[.!?,]",
        ],
        0..20,
    )
    .prop_map(|parts| parts.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn issues_hold_against_their_document(text in prose()) {
        let doc = Document::new(text);
        let result = ProofingEngine::new().analyze_document(&doc);

        prop_assert_eq!(result.for_doc_version, doc.version());
        prop_assert_eq!(result.score, quality_score(result.issues.len()));
        for issue in &result.issues {
            prop_assert!(issue.validate_against(&doc).is_ok());
            prop_assert!(issue.span.start < issue.span.end);
        }
    }

    #[test]
    fn filter_keeps_order_and_drops_only_dictionary_words(text in prose()) {
        let doc = Document::new(text);
        let issues = ProofingEngine::new().analyze_document(&doc).issues;
        let dictionary: Dictionary = ["thier", "happy"].into_iter().collect();

        let kept = filter_issues(issues.clone(), &dictionary);
        let expected: Vec<_> = issues
            .into_iter()
            .filter(|issue| !dictionary.contains(&issue.original_text))
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn utf16_offsets_land_on_char_boundaries(text in "\\PC{0,20}", offset in 0usize..50) {
        if let Some(byte) = utf16_to_byte_offset(&text, offset) {
            prop_assert!(text.is_char_boundary(byte));
            prop_assert_eq!(text[..byte].encode_utf16().count(), offset);
        }
    }

    #[test]
    fn readability_level_matches_grade(text in "[a-z .!?]{0,200}") {
        let readability = readability::calculate(&text);
        if text.split_whitespace().next().is_some() {
            prop_assert_eq!(
                readability.level,
                shared_types::ReadabilityLevel::from_grade(readability.grade)
            );
        }
    }
}
