//! Property-based tests for the audit checkers and statistics using proptest.

use proptest::prelude::*;

use normative_core::checks::{explicit, implicit, indirect};
use normative_core::combinations::{Combinations, binomial, multi_column_count, resolve_ceiling};
use normative_core::stats::{chi2_contingency, encode_labels, normalized_mutual_info};
use normative_core::{Dataset, IndirectException};

fn column_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,6}", 0..8).prop_map(|s| s.into_iter().collect())
}

// --- Explicit checker properties ---

proptest! {
    #[test]
    fn explicit_without_exceptions_is_identity(protected in column_names()) {
        prop_assert_eq!(explicit::check(&protected, &[]), protected);
    }

    #[test]
    fn explicit_with_all_excepted_is_empty(protected in column_names()) {
        prop_assert!(explicit::check(&protected, &protected).is_empty());
    }

    #[test]
    fn explicit_result_is_disjoint_from_exceptions(
        protected in column_names(),
        exceptions in column_names(),
    ) {
        let found = explicit::check(&protected, &exceptions);
        prop_assert!(found.iter().all(|p| !exceptions.contains(p)));
        prop_assert!(found.iter().all(|p| protected.contains(p)));
    }
}

// --- Combination enumeration properties ---

proptest! {
    #[test]
    fn combination_count_matches_binomial_sum(n in 0usize..9, max in prop::option::of(0usize..10)) {
        let ceiling = resolve_ceiling(max, n);
        let generated = Combinations::multi_column(n, ceiling).count();
        let expected: usize = (2..=ceiling).map(|k| binomial(n, k)).sum();
        prop_assert_eq!(generated, expected);
        prop_assert_eq!(multi_column_count(n, ceiling), expected);
    }

    #[test]
    fn combinations_are_strictly_increasing(n in 2usize..8) {
        for combo in Combinations::multi_column(n, n) {
            prop_assert!(combo.len() >= 2);
            prop_assert!(combo.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(combo.iter().all(|&i| i < n));
        }
    }

    #[test]
    fn implicit_matrix_has_one_row_per_candidate(n in 1usize..5, max in 0usize..5) {
        let names: Vec<String> = (0..n).map(|i| format!("x{i}")).collect();
        let mut columns: Vec<(String, Vec<String>)> = names
            .iter()
            .map(|name| (name.clone(), vec!["a".to_string(), "b".to_string()]))
            .collect();
        columns.push(("p".to_string(), vec!["m".to_string(), "f".to_string()]));
        let dataset = Dataset::from_columns(columns).unwrap();

        let matrix = implicit::correlation_matrix(&dataset, &names, &["p".to_string()], Some(max)).unwrap();
        let ceiling = resolve_ceiling(Some(max), n);
        prop_assert_eq!(matrix.candidates().len(), n + multi_column_count(n, ceiling));
    }
}

// --- Statistics properties ---

proptest! {
    #[test]
    fn nmi_is_bounded_and_symmetric(
        pairs in prop::collection::vec((0u8..5, 0u8..5), 1..60),
    ) {
        let a = encode_labels(pairs.iter().map(|(x, _)| *x));
        let b = encode_labels(pairs.iter().map(|(_, y)| *y));
        let ab = normalized_mutual_info(&a, &b);
        let ba = normalized_mutual_info(&b, &a);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn nmi_of_relabelled_column_is_one(values in prop::collection::vec(0u8..6, 1..60)) {
        let a = encode_labels(values.iter().copied());
        let b = encode_labels(values.iter().map(|v| v.wrapping_mul(7).wrapping_add(3)));
        prop_assert!((normalized_mutual_info(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn chi2_pvalue_is_a_probability(
        table in prop::collection::vec(prop::collection::vec(1u64..50, 3), 2),
    ) {
        let test = chi2_contingency(&table).unwrap();
        prop_assert!((0.0..=1.0).contains(&test.p_value));
        prop_assert!(test.statistic >= 0.0);
        prop_assert_eq!(test.degrees_of_freedom, 2);
    }
}

// --- Indirect checker properties ---

fn outcome_rows() -> impl Strategy<Value = Vec<(u8, bool)>> {
    prop::collection::vec((0u8..3, any::<bool>()), 2..80)
}

fn dataset_from(rows: &[(u8, bool)]) -> Dataset {
    Dataset::from_columns(vec![
        ("group", rows.iter().map(|(g, _)| format!("g{g}")).collect::<Vec<_>>()),
        (
            "outcome",
            rows.iter()
                .map(|(_, o)| if *o { "yes" } else { "no" }.to_string())
                .collect::<Vec<_>>(),
        ),
    ])
    .unwrap()
}

proptest! {
    #[test]
    fn indirect_findings_respect_thresholds(
        rows in outcome_rows(),
        ratio in 0.1f64..1.0,
        pvalue in 0.01f64..0.5,
    ) {
        let dataset = dataset_from(&rows);
        let findings = indirect::check(
            &dataset,
            &["group".to_string()],
            "outcome",
            &[],
            ratio,
            pvalue,
        )
        .unwrap();
        for finding in &findings {
            prop_assert!(finding.chi2.pvalue < pvalue);
            prop_assert!(finding.values.0 != finding.values.1);
        }
    }

    #[test]
    fn indirect_zero_pvalue_never_reports(rows in outcome_rows()) {
        let dataset = dataset_from(&rows);
        let findings =
            indirect::check(&dataset, &["group".to_string()], "outcome", &[], 0.8, 0.0).unwrap();
        prop_assert!(findings.is_empty());
    }

    #[test]
    fn indirect_suppression_is_idempotent(rows in outcome_rows()) {
        let dataset = dataset_from(&rows);
        let protected = ["group".to_string()];
        let first = indirect::check(&dataset, &protected, "outcome", &[], 0.8, 0.05).unwrap();
        let exceptions: Vec<IndirectException> = first.iter().map(IndirectException::from).collect();
        let second = indirect::check(&dataset, &protected, "outcome", &exceptions, 0.8, 0.05).unwrap();
        prop_assert!(second.is_empty());
    }
}
