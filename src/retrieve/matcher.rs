//! Fuzzy entity matching with a partial-ratio similarity score.
//!
//! The score aligns the shorter string against every window of the longer one
//! and keeps the best `2 * LCS / (len_a + len_b)` ratio, rounded to whole
//! percent. A substring scores exactly 1.0.

use serde::Serialize;

use crate::graph::EntityCategory;

use super::entity_cache::EntityCache;

/// Matching thresholds.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Keep matches scoring strictly above this.
    pub threshold: f32,
    /// Maximum number of matches returned.
    pub limit: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            limit: 10,
        }
    }
}

/// An entity whose label resembles the query text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMatch {
    #[serde(rename = "type")]
    pub category: EntityCategory,
    pub label: String,
    pub uri: String,
    /// Similarity in [0.0, 1.0].
    pub confidence: f32,
}

/// Rank cached entities by similarity to `text`.
///
/// With `category` set only that category is scanned. Results are sorted by
/// descending confidence; ties keep entity-cache order.
pub fn find_similar_entities(
    cache: &EntityCache,
    text: &str,
    category: Option<EntityCategory>,
    options: &MatchOptions,
) -> Vec<EntityMatch> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let query: Vec<char> = text.to_lowercase().chars().collect();

    let mut matches: Vec<EntityMatch> = cache
        .iter()
        .filter(|(c, _)| category.is_none_or(|wanted| wanted == *c))
        .filter_map(|(c, entry)| {
            let label: Vec<char> = entry.label.to_lowercase().chars().collect();
            let confidence = partial_ratio_chars(&query, &label);
            (confidence > options.threshold).then(|| EntityMatch {
                category: c,
                label: entry.label.clone(),
                uri: entry.uri.clone(),
                confidence,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    matches.truncate(options.limit);
    matches
}

/// Partial-ratio similarity of two strings in [0.0, 1.0].
pub fn partial_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio_chars(&a, &b)
}

fn partial_ratio_chars(a: &[char], b: &[char]) -> f32 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }
    if long.windows(short.len()).any(|w| w == short) {
        return 1.0;
    }

    // LCS over every window is never lower than a matching-blocks partial
    // ratio and often higher, so borderline labels can clear the threshold
    // where a block-based scorer would reject them.
    let mut best = 0.0f32;
    for start in 0..long.len() {
        let end = (start + short.len()).min(long.len());
        let window = &long[start..end];
        let common = lcs_len(short, window);
        let ratio = (2 * common) as f32 / (short.len() + window.len()) as f32;
        if ratio > best {
            best = ratio;
        }
    }
    (best * 100.0).round() / 100.0
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::query_cache::{DEFAULT_CAPACITY, QueryExecutor};
    use crate::graph::sparql::SparqlStore;

    const TURTLE: &str = r#"
        @prefix ayur: <http://example.org/ayurvedic/> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

        ayur:h_tulsi a ayur:Herb ; rdfs:label "Tulsi" .
        ayur:h_ashwagandha a ayur:Herb ; rdfs:label "Ashwagandha" .
        ayur:c_fever a ayur:Condition ; rdfs:label "Fever" .
        ayur:s_fever a ayur:Symptom ; rdfs:label "Fever" .
        ayur:c_common_cold a ayur:Condition ; rdfs:label "Common Cold" .
        ayur:d_vata a ayur:Dosha ; rdfs:label "Vata" .
    "#;

    fn cache() -> EntityCache {
        let exec = QueryExecutor::new(SparqlStore::from_turtle(TURTLE).unwrap(), DEFAULT_CAPACITY);
        EntityCache::build(&exec)
    }

    #[test]
    fn substring_scores_one() {
        assert_eq!(partial_ratio("tulsi", "tulsi"), 1.0);
        assert_eq!(partial_ratio("cold", "common cold"), 1.0);
        assert_eq!(partial_ratio("what helps a common cold", "common cold"), 1.0);
    }

    #[test]
    fn near_miss_scores_lower() {
        let score = partial_ratio("tulsii", "tulasi");
        assert!(score > 0.6 && score < 1.0, "score was {score}");
        assert!(partial_ratio("xyz", "tulsi") < 0.6);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(partial_ratio("", "tulsi"), 0.0);
    }

    #[test]
    fn exact_label_is_top_match() {
        let matches = find_similar_entities(&cache(), "Tulsi", None, &MatchOptions::default());
        assert_eq!(matches[0].label, "Tulsi");
        assert_eq!(matches[0].category, EntityCategory::Herb);
        assert_eq!(matches[0].confidence, 1.0);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let cache = cache();
        assert!(find_similar_entities(&cache, "", None, &MatchOptions::default()).is_empty());
        assert!(find_similar_entities(&cache, "   ", None, &MatchOptions::default()).is_empty());
    }

    #[test]
    fn ties_keep_cache_order() {
        let matches = find_similar_entities(&cache(), "fever", None, &MatchOptions::default());
        let fevers: Vec<EntityCategory> = matches
            .iter()
            .filter(|m| m.label == "Fever")
            .map(|m| m.category)
            .collect();
        assert_eq!(fevers, vec![EntityCategory::Condition, EntityCategory::Symptom]);
    }

    #[test]
    fn results_are_sorted_bounded_and_in_range() {
        let cache = cache();
        let options = MatchOptions {
            threshold: 0.0,
            limit: 3,
        };
        let matches = find_similar_entities(&cache, "a", None, &options);
        assert!(matches.len() <= 3);
        assert!(matches.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        assert!(matches.iter().all(|m| (0.0..=1.0).contains(&m.confidence)));
    }

    #[test]
    fn category_restriction_narrows_candidates() {
        let cache = cache();
        let options = MatchOptions::default();
        let all = find_similar_entities(&cache, "fever", None, &options);
        let only = find_similar_entities(&cache, "fever", Some(EntityCategory::Symptom), &options);
        assert!(only.len() <= all.len());
        assert!(only.iter().all(|m| m.category == EntityCategory::Symptom));
        assert!(only.iter().all(|m| all.contains(m)));
    }
}
