//! Title resolution. Pure functions over a lowercase title index; the
//! ambiguous case is returned to the caller instead of prompting.

use crate::config::MatchPolicy;
use crate::error::RecommendError;
use crate::models::{Candidate, MovieRecord, TitleSuggestion};
use std::collections::HashMap;

/// Key used for case-insensitive title comparison. Folds Unicode case.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

pub fn same_title(a: &str, b: &str) -> bool {
    normalize_title(a) == normalize_title(b)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(usize),
    Ambiguous(Vec<Candidate>),
    NotFound(Vec<TitleSuggestion>),
}

#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    lowered: Vec<String>,
    exact: HashMap<String, Vec<usize>>,
}

impl TitleIndex {
    pub fn build(records: &[MovieRecord]) -> Self {
        let lowered: Vec<String> = records.iter().map(|r| normalize_title(&r.title)).collect();
        let mut exact: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, title) in lowered.iter().enumerate() {
            if !title.is_empty() {
                exact.entry(title.clone()).or_default().push(index);
            }
        }
        Self { lowered, exact }
    }

    /// Indices whose title equals `query`, ignoring case, in corpus order.
    pub fn exact_matches(&self, query: &str) -> &[usize] {
        self.exact
            .get(&normalize_title(query))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Indices whose title contains `query`, ignoring case, in corpus order.
    pub fn substring_matches<'a>(&'a self, query: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.lowered
            .iter()
            .enumerate()
            .filter(move |(_, title)| !title.is_empty() && title.contains(query))
            .map(|(index, _)| index)
    }

    /// Applies the tie-break policy: exact match, then (for
    /// [`MatchPolicy::Fuzzy`]) the first substring match, then not found.
    /// Duplicate exact titles need `choice`, a position among them.
    pub fn resolve(
        &self,
        records: &[MovieRecord],
        query: &str,
        choice: Option<usize>,
        policy: MatchPolicy,
        max_suggestions: usize,
    ) -> Result<Resolution, RecommendError> {
        let needle = normalize_title(query);
        if needle.is_empty() {
            return Ok(Resolution::NotFound(Vec::new()));
        }

        match self.exact_matches(&needle) {
            [] => {}
            [single] => return Ok(Resolution::Resolved(*single)),
            duplicates => {
                let candidates: Vec<Candidate> = duplicates
                    .iter()
                    .enumerate()
                    .map(|(position, &index)| {
                        let record = &records[index];
                        Candidate {
                            position,
                            index,
                            id: record.id.clone(),
                            title: record.title.clone(),
                            release_date: record.release_date.clone(),
                        }
                    })
                    .collect();

                return match choice {
                    None => Ok(Resolution::Ambiguous(candidates)),
                    Some(position) => match candidates.get(position) {
                        Some(candidate) => Ok(Resolution::Resolved(candidate.index)),
                        None => Err(RecommendError::InvalidChoice {
                            choice: position,
                            candidates,
                        }),
                    },
                };
            }
        }

        match policy {
            MatchPolicy::Fuzzy => Ok(match self.substring_matches(&needle).next() {
                Some(index) => Resolution::Resolved(index),
                None => Resolution::NotFound(Vec::new()),
            }),
            MatchPolicy::Exact => {
                let suggestions = self
                    .substring_matches(&needle)
                    .take(max_suggestions)
                    .map(|index| TitleSuggestion {
                        title: records[index].title.clone(),
                        release_date: records[index].release_date.clone(),
                    })
                    .collect();
                Ok(Resolution::NotFound(suggestions))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("1", "Echo").with_release_date("1999-01-01"),
            MovieRecord::new("2", "The Dark Knight"),
            MovieRecord::new("3", "echo").with_release_date("2014-06-01"),
            MovieRecord::new("4", "The Dark Knight Rises"),
            MovieRecord::new("5", ""),
        ]
    }

    fn resolve(query: &str, choice: Option<usize>, policy: MatchPolicy) -> Result<Resolution, RecommendError> {
        let records = records();
        TitleIndex::build(&records).resolve(&records, query, choice, policy, 5)
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(
            resolve("the DARK knight", None, MatchPolicy::Fuzzy).unwrap(),
            Resolution::Resolved(1)
        );
    }

    #[test]
    fn test_exact_match_folds_non_ascii_case() {
        let records = vec![MovieRecord::new("1", "Amélie"), MovieRecord::new("2", "Amélie 2")];
        let index = TitleIndex::build(&records);
        assert_eq!(
            index.resolve(&records, " AMÉLIE ", None, MatchPolicy::Exact, 5).unwrap(),
            Resolution::Resolved(0)
        );
        assert!(same_title("AMÉLIE", "Amélie"));
        assert!(!"AMÉLIE".eq_ignore_ascii_case("Amélie"));
        assert!(!same_title("Amélie 2", "Amélie"));
    }

    #[test]
    fn test_substring_picks_first_in_corpus_order() {
        assert_eq!(resolve("dark", None, MatchPolicy::Fuzzy).unwrap(), Resolution::Resolved(1));
        assert_eq!(resolve("rises", None, MatchPolicy::Fuzzy).unwrap(), Resolution::Resolved(3));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            resolve("Casablanca", None, MatchPolicy::Fuzzy).unwrap(),
            Resolution::NotFound(Vec::new())
        );
        assert_eq!(resolve("  ", None, MatchPolicy::Fuzzy).unwrap(), Resolution::NotFound(Vec::new()));
    }

    #[test]
    fn test_duplicates_are_ambiguous() {
        match resolve("Echo", None, MatchPolicy::Fuzzy).unwrap() {
            Resolution::Ambiguous(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert_eq!(candidates[0].index, 0);
                assert_eq!(candidates[1].index, 2);
                assert_eq!(candidates[1].position, 1);
                assert_eq!(candidates[1].release_date.as_deref(), Some("2014-06-01"));
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_disambiguation_by_position() {
        assert_eq!(resolve("echo", Some(1), MatchPolicy::Fuzzy).unwrap(), Resolution::Resolved(2));
        let err = resolve("echo", Some(2), MatchPolicy::Fuzzy).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidChoice { choice: 2, .. }));
    }

    #[test]
    fn test_choice_ignored_for_unique_title() {
        assert_eq!(
            resolve("The Dark Knight Rises", Some(7), MatchPolicy::Fuzzy).unwrap(),
            Resolution::Resolved(3)
        );
    }

    #[test]
    fn test_exact_policy_returns_suggestions() {
        match resolve("dark", None, MatchPolicy::Exact).unwrap() {
            Resolution::NotFound(suggestions) => {
                let titles: Vec<&str> = suggestions.iter().map(|s| s.title.as_str()).collect();
                assert_eq!(titles, vec!["The Dark Knight", "The Dark Knight Rises"]);
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
    }
}
