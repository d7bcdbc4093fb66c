use crate::algorithms::sparse::CsrMatrix;
use crate::algorithms::text::TfidfVectorizer;
use crate::error::EvaluationError;
use crate::models::{EvaluationMetrics, MovieRecord, RecommendationResult};
use crate::utils::{jaccard_index, mean_or_zero, sparse_cosine_similarity};
use tracing::debug;

/// Quality diagnostics for a recommendation set. Holds its own TF-IDF model
/// over genre text, independent of the features used for ranking.
#[derive(Debug, Clone)]
pub struct Evaluator {
    genre_text: CsrMatrix,
}

impl Evaluator {
    pub fn fit(records: &[MovieRecord]) -> Self {
        let documents: Vec<String> = records.iter().map(MovieRecord::genre_text).collect();
        let (_, genre_text) = TfidfVectorizer::new().fit_transform(&documents);
        Self { genre_text }
    }

    pub fn content_relevance(&self, a: usize, b: usize) -> f64 {
        sparse_cosine_similarity(self.genre_text.row(a), self.genre_text.row(b))
    }

    pub fn evaluate(
        &self,
        records: &[MovieRecord],
        result: &RecommendationResult,
        query_index: usize,
    ) -> Result<EvaluationMetrics, EvaluationError> {
        let query = records
            .get(query_index)
            .ok_or(EvaluationError::QueryOutOfRange(query_index))?;

        let mut overlaps = Vec::with_capacity(result.len());
        let mut rating_diffs = Vec::with_capacity(result.len());
        let mut relevances = Vec::with_capacity(result.len());
        let mut rating_skipped = 0;

        for item in &result.items {
            let recommended = records
                .get(item.index)
                .ok_or(EvaluationError::RecommendationOutOfRange(item.index))?;

            overlaps.push(jaccard_index(&query.genres, &recommended.genres));

            match (query.vote_average, recommended.vote_average) {
                (Some(q), Some(r)) => rating_diffs.push((r - q).abs()),
                _ => rating_skipped += 1,
            }

            relevances.push(self.content_relevance(query_index, item.index));
        }

        let metrics = EvaluationMetrics {
            genre_overlap: mean_or_zero(&overlaps) * 100.0,
            rating_difference: mean_or_zero(&rating_diffs),
            content_relevance: mean_or_zero(&relevances) * 100.0,
            evaluated: result.len(),
            rating_skipped,
        };
        debug!("Evaluation for '{}': {:?}", query.title, metrics);
        Ok(metrics)
    }
}
