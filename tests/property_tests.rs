/// Property-based tests using proptest
/// Tests invariants of identifier normalization, search blobs and matching
use proptest::prelude::*;
use rust_lookup_api::matcher::{find, MatchMode, MatchQuery};
use rust_lookup_api::models::{build_search_blob, Record, RecordFields, SearchQuery};
use rust_lookup_api::normalizer::{normalize, normalize_identifier};
use rust_lookup_api::store::RecordStore;
use rust_lookup_api::table::{Cell, RawTable};

fn record(name: &str, dpi: &str, nit: &str, email: &str) -> Record {
    Record::new(RecordFields {
        full_name: name.to_string(),
        national_id: dpi.to_string(),
        tax_id: nit.to_string(),
        email: email.to_string(),
        ..Default::default()
    })
}

fn search(name: &str, dpi: &str, nit: &str, value: &str) -> SearchQuery {
    let opt = |s: &str| Some(s.to_string());
    SearchQuery {
        name: opt(name),
        national_id: opt(dpi),
        tax_id: opt(nit),
        value: opt(value),
    }
}

// Property: identifier normalization
proptest! {
    #[test]
    fn float_artifact_always_stripped(id in "[0-9]{4,13}") {
        prop_assert_eq!(normalize_identifier(&format!("{}.0", id)), id);
    }

    #[test]
    fn whitespace_never_survives(id in "[ 0-9\\t]{0,20}") {
        let normalized = normalize_identifier(&id);
        prop_assert!(!normalized.chars().any(char::is_whitespace));
    }

    #[test]
    fn normalization_is_idempotent(id in "[0-9]{1,12}(\\.0)?") {
        let once = normalize_identifier(&id);
        prop_assert_eq!(normalize_identifier(&once), once.clone());
    }

    #[test]
    fn digit_order_preserved(parts in proptest::collection::vec("[0-9]{1,4}", 1..5)) {
        let spaced = format!(" {} ", parts.join(" "));
        prop_assert_eq!(normalize_identifier(&spaced), parts.concat());
    }
}

// Property: search blob derivation
proptest! {
    #[test]
    fn blob_is_lowercase_join_in_fixed_order(
        name in "[A-Za-z ]{0,20}",
        dpi in "[0-9]{0,13}",
        nit in "[0-9K-]{0,10}",
        email in "[A-Za-z0-9.@]{0,20}"
    ) {
        let r = record(&name, &dpi, &nit, &email);
        prop_assert_eq!(r.search_blob().to_string(), build_search_blob(&name, &dpi, &nit, &email));
        prop_assert_eq!(
            r.search_blob().to_string(),
            format!("{} {} {} {}", name, dpi, nit, email).to_lowercase()
        );
    }

    #[test]
    fn reload_recomputes_identical_blobs(
        name in "[A-Za-z]{1,12}",
        dpi in "[0-9]{8}",
        email in "[a-z]{1,8}@[a-z]{1,8}\\.com"
    ) {
        let table = RawTable::new(
            vec!["NOMBRE_CLIENTE".into(), "DPI".into(), "EMAIL".into()],
            vec![vec![Cell::from(name.as_str()), Cell::from(dpi.as_str()), Cell::from(email.as_str())]],
        );
        let first = normalize(&table);
        let second = normalize(&table);
        prop_assert_eq!(first.records()[0].search_blob(), second.records()[0].search_blob());
    }
}

// Property: exact triple mode is a conjunction
proptest! {
    #[test]
    fn exact_triple_requires_all_three(
        name in "[A-Za-z]{3,10}( [A-Za-z]{3,10})?",
        dpi in "[0-9]{8}",
        nit in "[0-9]{8}",
        which in 0usize..3
    ) {
        let store = RecordStore::new(vec![record(&name, &dpi, &nit, "x@y.com")]);

        let exact = MatchQuery::from_search(&search(&name.to_uppercase(), &dpi, &nit, "")).unwrap();
        prop_assert_eq!(exact.mode(), MatchMode::ExactTriple);
        prop_assert_eq!(find(&store, &exact).count(), 1);

        let (mut n, mut d, mut t) = (name.clone(), dpi.clone(), nit.clone());
        match which {
            0 => n.push('z'),
            1 => d.push('9'),
            _ => t.push('9'),
        }
        let broken = MatchQuery::from_search(&search(&n, &d, &t, "")).unwrap();
        prop_assert_eq!(broken.mode(), MatchMode::ExactTriple);
        prop_assert_eq!(find(&store, &broken).count(), 0);
    }

    #[test]
    fn blank_queries_always_rejected(
        name in "[ \\t]{0,4}",
        dpi in "[ ]{0,4}",
        nit in "[ ]{0,4}"
    ) {
        prop_assert!(MatchQuery::from_search(&search(&name, &dpi, &nit, "")).is_err());
    }
}

// Property: matching is literal
proptest! {
    #[test]
    fn value_match_equals_literal_containment(
        value in "[a-z.*+?()\\[\\]|^$ ]{1,6}",
        blob_name in "[a-z.*+?()\\[\\]|^$ ]{1,20}"
    ) {
        prop_assume!(!value.trim().is_empty());
        let r = record(&blob_name, "", "", "");
        let store = RecordStore::new(vec![r.clone()]);
        let q = MatchQuery::from_search(&search("", "", "", &value)).unwrap();

        let expected = r.search_blob().contains(q.value());
        prop_assert_eq!(find(&store, &q).count() == 1, expected);
    }

    #[test]
    fn matching_never_panics(query in "\\PC{0,20}", name in "\\PC{0,20}") {
        let store = RecordStore::new(vec![record(&name, "1", "2", "e@x.com")]);
        if let Ok(q) = MatchQuery::from_search(&search(&query, "", "", &query)) {
            let _ = find(&store, &q).count();
        }
    }
}
