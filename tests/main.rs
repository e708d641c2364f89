use std::collections::BTreeSet;

use nearlit::*;
use nearlit::test::*;

fn test_tree() -> BkTree<SourcePosition> {
    build_index(get_test_candidates())
}

fn words(matches: &[&IndexedWord<SourcePosition>]) -> BTreeSet<String> {
    matches.iter().map(|node| node.word.clone()).collect()
}

///Linear scan over everything in the index, for comparison against the pruned search
fn brute_force(tree: &BkTree<SourcePosition>, query: &str, radius: DistanceType) -> BTreeSet<String> {
    let query = normalize(query);
    tree.iter()
        .filter(|node| {
            let distance = DamerauLevenshtein.distance(&node.word, &query);
            distance > 0 && distance <= radius
        })
        .map(|node| node.word.clone())
        .collect()
}

#[test]
fn test0001_distance() {
    assert_eq!(DamerauLevenshtein.distance("hello", "hella"), 1);
    assert_eq!(DamerauLevenshtein.distance("connection refused", "conection refused"), 1);
    assert_eq!(DamerauLevenshtein.distance("teh", "the"), 1);
    assert_eq!(DamerauLevenshtein.distance("cat", "cat"), 0);
}

#[test]
fn test0101_index_size() {
    let tree = test_tree();
    assert_eq!(tree.len(), LITERALS.len());
    assert_eq!(tree.root().expect("root").word, "hello");
}

#[test]
fn test0102_index_duplicates() {
    let mut tree = test_tree();
    let size = tree.len();
    assert!(matches!(tree.insert("HELLO", SourcePosition::unknown()), Insertion::Duplicate(_)));
    assert!(matches!(tree.insert("cats", SourcePosition::unknown()), Insertion::Duplicate(_)));
    assert_eq!(tree.len(), size);
}

#[test]
fn test0103_index_child_invariant() {
    let tree = test_tree();
    for node in tree.iter() {
        for (distance, child) in node.children() {
            let child = tree.get(child).expect("child in arena");
            assert_ne!(distance, 0);
            assert_eq!(DamerauLevenshtein.distance(&node.word, &child.word), distance);
        }
    }
}

#[test]
fn test0201_search_matches_brute_force() {
    let tree = test_tree();
    for query in get_test_queries() {
        for radius in 0..=4 {
            assert_eq!(words(&tree.search(&query, radius)), brute_force(&tree, &query, radius), "query={} radius={}", query, radius);
        }
    }
    //queries that are not in the index
    for query in ["helo", "invalid argumnt", "xyz", "connection reused"] {
        for radius in 0..=4 {
            assert_eq!(words(&tree.search(query, radius)), brute_force(&tree, query, radius), "query={} radius={}", query, radius);
        }
    }
}

#[test]
fn test0202_search_self_exclusion() {
    let tree = test_tree();
    for query in get_test_queries() {
        for radius in 0..=4 {
            let normalized = normalize(&query);
            assert!(tree.search(&query, radius).iter().all(|node| node.word != normalized));
        }
    }
}

#[test]
fn test0203_search_radius_monotonicity() {
    let tree = test_tree();
    for query in get_test_queries() {
        for radius in 0..4 {
            let smaller = words(&tree.search(&query, radius));
            let larger = words(&tree.search(&query, radius + 1));
            assert!(smaller.is_subset(&larger), "query={} radius={}", query, radius);
        }
    }
}

#[test]
fn test0204_search_distance_bound() {
    let tree = test_tree();
    for query in get_test_queries() {
        for radius in 0..=4 {
            for node in tree.search(&query, radius) {
                let distance = DamerauLevenshtein.distance(&node.word, &normalize(&query));
                assert!(distance > 0 && distance <= radius);
            }
        }
    }
}

#[test]
fn test0205_search_case_insensitive() {
    let mut mixed = BkTree::new();
    mixed.insert("Hello", 1);
    mixed.insert("Jello", 2);
    let mut lower = BkTree::new();
    lower.insert("hello", 1);
    lower.insert("jello", 2);
    for query in ["hello", "HELLO", "jello"] {
        for radius in 0..=2 {
            let a: Vec<(String, i32)> = mixed.search(query, radius).iter().map(|n| (n.word.clone(), n.position)).collect();
            let b: Vec<(String, i32)> = lower.search(query, radius).iter().map(|n| (n.word.clone(), n.position)).collect();
            assert_eq!(a, b);
        }
    }
    assert!(mixed.search("hello", 0).is_empty());
}

#[test]
fn test0301_collect_reciprocal_collapse() {
    let tree = build_index(vec![
        ("Hello", SourcePosition::new("main.go", 3, 10)),
        ("Hella", SourcePosition::new("util.go", 7, 2)),
    ]);
    let result = collect_matches(&tree, &["Hello", "Hella"], &get_test_params(1));
    assert_eq!(result.len(), 1);
    let associations = result.get("Hello").expect("entry for the first-seen query");
    assert_eq!(associations.len(), 1);
    assert_eq!(associations[0].word(), "hella");
    assert_eq!(associations[0].position(), &SourcePosition::new("util.go", 7, 2));
    assert_eq!(associations[0].label, "Hello <-> hella");
    assert!(!result.contains("Hella"));
}

#[test]
fn test0302_collect_dedup_identical_match_sets() {
    let tree = build_index(vec![("cat", 1), ("cats", 2), ("cot", 3)]);
    let result = collect_matches(&tree, &["cat", "cats", "cot"], &get_test_params(1));
    //"cats" and "cot" both match exactly ["cat"], only the first survives
    assert_eq!(result.queries().collect::<Vec<_>>(), vec!["cat", "cats"]);
    let words: Vec<&str> = result.get("cat").expect("cat").iter().map(|a| a.word()).collect();
    assert_eq!(words, vec!["cats", "cot"]);
}

#[test]
fn test0303_collect_empty_result_omission() {
    let tree = build_index(vec![("Hello", 1), ("Hella", 2), ("zebra", 3)]);
    let result = collect_matches(&tree, &["zebra", "Hello", "Hella"], &get_test_params(1));
    assert!(!result.contains("zebra"));
    assert_eq!(result.queries().collect::<Vec<_>>(), vec!["Hello"]);
}

#[test]
fn test0304_collect_radius_zero() {
    let tree = test_tree();
    let result = collect_matches(&tree, &get_test_queries(), &get_test_params(0));
    assert!(result.is_empty());
}

#[test]
fn test0305_collect_fixture() {
    let tree = test_tree();
    let result = collect_matches(&tree, &get_test_queries(), &get_test_params(1));
    assert_eq!(result.queries().collect::<Vec<_>>(), vec![
        "Hello",
        "cat",
        "cats",
        "connection refused",
        "invalid argument",
        "book",
        "books",
        "boo",
        "boon",
    ]);
    let book: Vec<&str> = result.get("book").expect("book").iter().map(|a| a.word()).collect();
    assert_eq!(book, vec!["boo", "books", "boon", "cook"]);
}

#[test]
fn test0306_collect_parallel_is_deterministic() {
    let tree = test_tree();
    let queries = get_test_queries();
    for radius in 0..=3 {
        let sequential = collect_matches(&tree, &queries, &get_test_params(radius));
        let parallel = collect_matches(&tree, &queries, &MatchParameters::default().with_radius(radius));
        assert_eq!(sequential.rows(), parallel.rows());
    }
}

#[test]
fn test0307_collect_no_reciprocal_duplicates() {
    let tree = test_tree();
    let result = collect_matches(&tree, &get_test_queries(), &get_test_params(2));
    for entry in result.iter() {
        for association in entry.associations.iter() {
            //if the match was itself retained as a query, it must not match only us back
            let reverse = result
                .iter()
                .find(|other| normalize(&other.query) == association.word());
            if let Some(reverse) = reverse {
                let back: Vec<&str> = reverse.associations.iter().map(|a| a.word()).collect();
                assert!(!(entry.associations.len() == 1 && back == vec![normalize(&entry.query).as_str()]));
            }
        }
    }
}

#[test]
fn test0401_candidates_end_to_end() {
    let input = "Hello\tmain.go:3:10\nHella\tutil.go:7:2\n%d\tmain.go:4:1\nHello\tmain.go:20:4\n";
    let mut filter = CandidateFilter::new().expect("filter");
    let candidates = read_candidates(input.as_bytes(), &mut filter).expect("valid input");
    let queries: Vec<&str> = candidates.iter().map(|(literal, _)| literal.as_str()).collect();
    let tree = build_index(candidates.iter().map(|(literal, position)| (literal.as_str(), position.clone())));
    let result = collect_matches(&tree, &queries, &get_test_params(2));
    let rows = result.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "Hello");
    assert_eq!(rows[0].1, vec![(&SourcePosition::new("util.go", 7, 2), "hella", "Hello <-> hella")]);
}

#[test]
fn test0402_report_serialization() {
    let tree = build_index(vec![("Hello", SourcePosition::new("main.go", 3, 10)), ("Hella", SourcePosition::new("util.go", 7, 2))]);
    let result = collect_matches(&tree, &["Hello", "Hella"], &get_test_params(1));
    let json = serde_json::to_value(result.to_report()).expect("serializable");
    assert_eq!(json, serde_json::json!([
        {
            "query": "Hello",
            "matches": [
                {
                    "word": "hella",
                    "position": { "file": "util.go", "line": 7, "column": 2 },
                    "label": "Hello <-> hella"
                }
            ]
        }
    ]));
}
