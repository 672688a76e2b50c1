//! Candidate merging across fan-out results

use std::collections::HashSet;

use super::fanout::SimilarityResult;

/// Deduplicated candidate titles in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    titles: Vec<String>,
}

impl CandidateSet {
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Consecutive batches of at most `size` titles
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, String> {
        self.titles.chunks(size)
    }

    pub fn batch_count(&self, size: usize) -> usize {
        self.titles.len().div_ceil(size)
    }
}

/// Merges per-seed results into at most `cap` distinct titles.
///
/// Seeds are walked in order and each seed's titles in returned order; the first
/// occurrence of a title wins. Titles compare by exact string, so "The Thing" and
/// "the thing" are two candidates, and a blank title is a candidate like any other.
/// Failed seeds contribute nothing.
pub fn merge_candidates(results: &[SimilarityResult], cap: usize) -> CandidateSet {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut titles = Vec::new();

    let offered = results
        .iter()
        .filter(|result| result.success)
        .flat_map(|result| result.candidate_titles.iter());

    for title in offered {
        if titles.len() >= cap {
            break;
        }
        if seen.insert(title.as_str()) {
            titles.push(title.clone());
        }
    }

    CandidateSet { titles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn found(titles: &[&str]) -> SimilarityResult {
        SimilarityResult::found(titles.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_first_seen_order_across_seeds() {
        let results = vec![
            found(&["Aliens", "Prometheus"]),
            found(&["Prometheus", "Predator", "Aliens"]),
            found(&["Terminator"]),
        ];

        let merged = merge_candidates(&results, 30);
        assert_eq!(
            merged.titles(),
            &["Aliens", "Prometheus", "Predator", "Terminator"]
        );
    }

    #[test]
    fn test_failed_seed_contributes_nothing() {
        let results = vec![
            found(&["A1", "A2"]),
            SimilarityResult::failed(),
            found(&["C1", "A1"]),
        ];

        let merged = merge_candidates(&results, 30);
        let expected = merge_candidates(&[found(&["A1", "A2"]), found(&["C1", "A1"])], 30);

        assert_eq!(merged, expected);
        assert_eq!(merged.titles(), &["A1", "A2", "C1"]);
    }

    #[test]
    fn test_cap_stops_later_seeds() {
        let results = vec![found(&["A", "B", "C"]), found(&["D", "E"])];

        let merged = merge_candidates(&results, 4);
        assert_eq!(merged.titles(), &["A", "B", "C", "D"]);
    }

    #[test]
    fn test_titles_compare_case_sensitively() {
        let results = vec![found(&["The Thing"]), found(&["the thing", "The Thing"])];

        let merged = merge_candidates(&results, 30);
        assert_eq!(merged.titles(), &["The Thing", "the thing"]);
    }

    #[test]
    fn test_blank_titles_take_cap_slots() {
        let merged = merge_candidates(&[found(&["", "Heat", "", "Ronin"])], 2);
        assert_eq!(merged.titles(), &["", "Heat"]);
    }

    #[test]
    fn test_all_failed_is_empty() {
        let merged = merge_candidates(&[SimilarityResult::failed(), SimilarityResult::failed()], 30);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_batches_partition_in_order() {
        let merged = merge_candidates(&[found(&["1", "2", "3", "4", "5"])], 30);

        let sizes: Vec<_> = merged.batches(2).map(<[String]>::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(merged.batch_count(2), 3);
        assert_eq!(merged.batch_count(8), 1);
    }

    fn overlapping_results() -> impl Strategy<Value = Vec<SimilarityResult>> {
        // A small title alphabet forces plenty of overlap between seeds
        let titles = prop::collection::vec("[a-f]{1,2}", 0..12);
        let result = (any::<bool>(), titles).prop_map(|(success, titles)| {
            if success {
                SimilarityResult::found(titles)
            } else {
                SimilarityResult::failed()
            }
        });
        prop::collection::vec(result, 0..8)
    }

    proptest! {
        #[test]
        fn prop_bounded_and_unique(results in overlapping_results(), cap in 1usize..40) {
            let merged = merge_candidates(&results, cap);

            prop_assert!(merged.len() <= cap);
            let unique: HashSet<_> = merged.titles().iter().collect();
            prop_assert_eq!(unique.len(), merged.len());
        }

        #[test]
        fn prop_is_prefix_of_first_seen_sequence(results in overlapping_results(), cap in 1usize..40) {
            let mut first_seen: Vec<String> = Vec::new();
            for result in results.iter().filter(|r| r.success) {
                for title in &result.candidate_titles {
                    if !first_seen.contains(title) {
                        first_seen.push(title.clone());
                    }
                }
            }

            let merged = merge_candidates(&results, cap);
            prop_assert_eq!(merged.titles(), &first_seen[..merged.len()]);
            prop_assert_eq!(merged.len(), first_seen.len().min(cap));
        }
    }
}
