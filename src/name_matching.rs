use std::cmp::Ordering;

use itertools::Itertools;


static DEFAULT_MAX_RESULTS: usize = 10;
static DEFAULT_THRESHOLD: f64 = 0.6;
pub static DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.8;

// common abbreviations in station names, expanded before comparing
static ABBREVIATIONS: [(&str, &str); 2] = [("str.", "straße"), ("g.", "gasse")];

/// Suggests known station names for a name that wasn't found.
pub trait NameMatcher {
    fn suggest(&self, name: &str, candidates: &[String], max_results: usize, threshold: f64)
               -> Vec<String>;

    fn suggest_default(&self, name: &str, candidates: &[String]) -> Vec<String> {
        self.suggest(name, candidates, DEFAULT_MAX_RESULTS, DEFAULT_THRESHOLD)
    }
}

/// Matches names that contain one another, or whose Ratcliff-Obershelp similarity meets the
/// threshold.  Containment counts as a perfect match.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatcher;

impl NameMatcher for SimilarityMatcher {
    fn suggest(&self, name: &str, candidates: &[String], max_results: usize, threshold: f64)
               -> Vec<String> {
        let mut query = name.to_lowercase();
        for (short, long) in ABBREVIATIONS.iter() {
            query = query.replace(short, long);
        }

        candidates.iter()
            .filter_map(|candidate| {
                let lowered = candidate.to_lowercase();
                let score = if lowered.contains(&query) || query.contains(&lowered) {
                    1.
                } else {
                    similarity_ratio(&query, &lowered)
                };
                if score >= threshold {
                    Some((score, candidate))
                } else {
                    None
                }
            })
            // stable, so equally good matches keep their original order
            .sorted_by(|(aa, _), (bb, _)| bb.partial_cmp(aa).unwrap_or(Ordering::Equal))
            .map(|(_, candidate)| candidate.clone())
            .unique()
            .take(max_results)
            .collect()
    }
}

/// Pairs of names that probably refer to the same station: one contains the other, or they are at
/// least `threshold` similar.  Pairs come out in the order the names are given.
pub fn detect_possible_duplicates(names: &[String], threshold: f64) -> Vec<(String, String)> {
    names.iter()
        .tuple_combinations()
        .filter(|(aa, bb)| aa.contains(bb.as_str()) || bb.contains(aa.as_str()) ||
                           similarity_ratio(aa, bb) >= threshold)
        .map(|(aa, bb)| (aa.clone(), bb.clone()))
        .collect()
}

/// Twice the number of matching characters over the total length of both strings, where
/// matching characters are found by repeatedly taking the longest common substring.
pub fn similarity_ratio(aa: &str, bb: &str) -> f64 {
    let aa: Vec<char> = aa.chars().collect();
    let bb: Vec<char> = bb.chars().collect();
    let total = aa.len() + bb.len();
    if total == 0 {
        return 1.;
    }
    2. * matching_chars(&aa, &bb) as f64 / total as f64
}

fn matching_chars(aa: &[char], bb: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_substring(aa, bb);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&aa[..start_a], &bb[..start_b])
        + matching_chars(&aa[start_a + len..], &bb[start_b + len..])
}

// earliest longest match, by dynamic programming over suffix lengths
fn longest_common_substring(aa: &[char], bb: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev_row = vec![0; bb.len() + 1];
    for ii in 0..aa.len() {
        let mut row = vec![0; bb.len() + 1];
        for jj in 0..bb.len() {
            if aa[ii] == bb[jj] {
                row[jj + 1] = prev_row[jj] + 1;
                if row[jj + 1] > best.2 {
                    best = (ii + 1 - row[jj + 1], jj + 1 - row[jj + 1], row[jj + 1]);
                }
            }
        }
        prev_row = row;
    }
    best
}
