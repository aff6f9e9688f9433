//! Best-match selection over the knowledge base.
//!
//! The query is scored against every stored question and the single
//! highest-scoring record wins, provided its score reaches
//! [`SIMILARITY_THRESHOLD`]. Scoring is delegated to a [`Scorer`] so the
//! similarity function can be swapped without touching selection.

use crate::fuzz;
use crate::models::{FaqRecord, MatchResult};

/// Minimum score (0–100) for a match to be accepted. Higher is stricter.
pub const SIMILARITY_THRESHOLD: f64 = 70.0;

/// A string similarity function on a 0–100 scale, higher meaning closer.
pub trait Scorer {
    fn score(&self, query: &str, choice: &str) -> f64;
}

/// Weighted-ratio scorer from [`fuzz::wratio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

impl Scorer for WeightedRatio {
    fn score(&self, query: &str, choice: &str) -> f64 {
        fuzz::wratio(query, choice)
    }
}

impl<F> Scorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, query: &str, choice: &str) -> f64 {
        self(query, choice)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Matcher<S = WeightedRatio> {
    scorer: S,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Scorer> Matcher<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Index and score of the best-scoring question, or `None` if `records` is empty.
    ///
    /// On ties the earliest record wins.
    pub fn best_candidate(&self, query: &str, records: &[FaqRecord]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, rec) in records.iter().enumerate() {
            let score = self.scorer.score(query, &rec.question);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((idx, score)),
            }
            if score >= 100.0 {
                break;
            }
        }
        best
    }

    pub fn find_best_match(&self, query: &str, records: &[FaqRecord]) -> MatchResult {
        let Some((idx, score)) = self.best_candidate(query, records) else {
            return MatchResult::none();
        };

        if score >= SIMILARITY_THRESHOLD {
            tracing::debug!(index = idx, score, "query matched");
            MatchResult {
                answer: Some(records[idx].answer.clone()),
                score,
            }
        } else {
            tracing::debug!(best_index = idx, score, "no confident match");
            MatchResult {
                answer: None,
                score,
            }
        }
    }
}

/// Match `query` with the default weighted-ratio scorer.
pub fn find_best_match(query: &str, records: &[FaqRecord]) -> MatchResult {
    Matcher::new().find_best_match(query, records)
}
