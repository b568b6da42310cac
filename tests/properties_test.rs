use findora::processor::find_matches;
use findora::{rank, walk, ExtensionSet, Match, RankCriterion, SearchResult, WalkOptions};
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn text_strategy() -> impl Strategy<Value = String> {
    "[abAB \n]{0,200}(\r\n[abAB ]{0,20})?"
}

fn query_strategy() -> impl Strategy<Value = String> {
    "[abAB]{1,3}"
}

fn expected_count(text: &str, query: &str, case_sensitive: bool) -> usize {
    text.lines()
        .map(|line| {
            if case_sensitive {
                line.matches(query).count()
            } else {
                line.to_lowercase().matches(&query.to_lowercase()).count()
            }
        })
        .sum()
}

fn source_slice(text: &str, m: &Match) -> String {
    let line = text.lines().nth(m.line_number - 1).unwrap_or_default();
    line.chars()
        .skip(m.column)
        .take(m.matched_text.chars().count())
        .collect()
}

proptest! {
    #[test]
    fn match_count_equals_literal_occurrences(
        text in text_strategy(),
        query in query_strategy(),
        case_sensitive in any::<bool>(),
    ) {
        let matches = find_matches(&text, &query, case_sensitive, 0);
        prop_assert_eq!(matches.len(), expected_count(&text, &query, case_sensitive));
    }

    #[test]
    fn case_insensitive_matches_preserve_source_text(
        text in text_strategy(),
        query in query_strategy(),
    ) {
        for m in find_matches(&text, &query, false, 1) {
            prop_assert_eq!(m.matched_text.to_lowercase(), query.to_lowercase());
            prop_assert_eq!(source_slice(&text, &m), m.matched_text.clone());
            prop_assert!(m.context.contains(&m.matched_text));
        }
    }

    #[test]
    fn successive_matches_on_a_line_never_overlap(
        text in text_strategy(),
        query in query_strategy(),
        case_sensitive in any::<bool>(),
    ) {
        let matches = find_matches(&text, &query, case_sensitive, 0);
        let len = query.chars().count();
        for pair in matches.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.line_number <= b.line_number);
            if a.line_number == b.line_number {
                prop_assert!(b.column >= a.column + len);
            }
        }
    }

    #[test]
    fn ranking_is_stable_and_repeatable(
        keys in prop::collection::vec((0usize..4, 0u64..4, 0i64..4), 0..20),
        criterion in prop_oneof![
            Just(RankCriterion::Relevance),
            Just(RankCriterion::Date),
            Just(RankCriterion::Size),
        ],
    ) {
        let results: Vec<SearchResult> = keys
            .iter()
            .enumerate()
            .map(|(i, &(count, size, modified))| SearchResult {
                file_path: PathBuf::from(format!("/r/{i}.txt")),
                file_name: format!("{i}.txt"),
                matches: vec![
                    Match {
                        line_number: 1,
                        column: 0,
                        context: "x".into(),
                        matched_text: "x".into(),
                    };
                    count + 1
                ],
                file_size: size,
                modified,
            })
            .collect();

        let once = rank(results.clone(), criterion);
        let twice = rank(results, criterion);
        prop_assert_eq!(&once, &twice);

        if criterion == RankCriterion::Relevance {
            for pair in once.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.matches.len() >= b.matches.len());
                if a.matches.len() == b.matches.len() {
                    let index = |r: &SearchResult| r.file_name.trim_end_matches(".txt").parse::<usize>().unwrap();
                    prop_assert!(index(a) < index(b));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn walker_only_yields_allowed_regular_files(
        files in prop::collection::vec(("[a-z]{1,8}", prop_oneof!["txt", "md", "rs", "TXT", ""]), 1..12),
        nested in any::<bool>(),
    ) {
        let dir = TempDir::new().unwrap();
        let base = if nested { dir.path().join("sub/dir") } else { dir.path().to_path_buf() };
        fs::create_dir_all(&base).unwrap();
        for (stem, ext) in &files {
            let name = if ext.is_empty() { stem.clone() } else { format!("{stem}.{ext}") };
            fs::write(base.join(name), "content").unwrap();
        }

        let allowed = ExtensionSet::new(["txt", "md"]).unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        for path in walk(dir.path(), &allowed, &WalkOptions::default()).unwrap() {
            let ext = path.extension().unwrap().to_string_lossy().to_lowercase();
            prop_assert!(allowed.contains(&ext));
            prop_assert!(path.is_file());
            prop_assert!(path.starts_with(&root));
        }
    }
}
