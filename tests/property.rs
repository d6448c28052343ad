//! Property tests for normalization and scoring invariants.

use proptest::prelude::*;

use rebus_eval::analysis::{extract_answer, normalize_answer, score_answer, token_f1, ScoreOptions};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn normalize_is_idempotent(s in "\\PC{0,60}", strip in any::<bool>()) {
        let once = normalize_answer(&s, strip);
        let twice = normalize_answer(&once, strip);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_output_alphabet(s in "\\PC{0,60}") {
        let out = normalize_answer(&s, false);
        prop_assert!(out.chars().all(|c| c.is_alphanumeric() || c == ' '));
        prop_assert!(!out.contains("  "));
        prop_assert!(out == out.trim());
    }

    #[test]
    fn exact_match_ignores_padding(
        a in "[a-z]{1,12}( [a-z]{1,12}){0,4}",
        pad in " {0,3}",
    ) {
        let padded = format!("{}{}{}", pad, a, pad);
        let score = score_answer(&padded, &a, ScoreOptions::default());
        prop_assert!(score.exact_match);
        prop_assert!(score.normalized_match);
    }

    #[test]
    fn exact_match_implies_normalized(a in "\\PC{0,40}", b in "\\PC{0,40}") {
        let score = score_answer(&a, &b, ScoreOptions::default());
        if score.exact_match {
            prop_assert!(score.normalized_match);
        }
    }

    #[test]
    fn token_f1_bounded(a in "\\PC{0,40}", b in "\\PC{0,40}") {
        let f1 = token_f1(&a, &b);
        prop_assert!((0.0..=1.0).contains(&f1));
    }

    #[test]
    fn token_f1_self_is_one(s in "[a-z]{1,10}( [a-z]{1,10}){0,5}") {
        prop_assert_eq!(token_f1(&s, &s), 1.0);
    }

    #[test]
    fn token_f1_symmetric(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
        let ab = token_f1(&a, &b);
        let ba = token_f1(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn extraction_is_total(s in "\\PC{0,120}") {
        // Extraction may never panic or return nothing; at worst it hands
        // back the trimmed input.
        let extraction = extract_answer(&s);
        prop_assert!(extraction.text.len() <= s.len());
    }
}
