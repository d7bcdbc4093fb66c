use crate::algorithms::similarity::SimilarityMatrix;
use crate::algorithms::svd::{FittedSvd, TruncatedSvd};
use crate::algorithms::{build_feature_space, FeatureSpace};
use crate::config::{Config, FeatureConfig, ReductionConfig, RecommendationConfig};
use crate::error::{EvaluationError, FeatureBuildError, IngestionError, RecommendError, RecommenderError};
use crate::ingest::{self, Corpus, CsvSource, RecordSource};
use crate::models::*;
use crate::services::evaluation::Evaluator;
use crate::services::lookup::{same_title, Resolution, TitleIndex};
use chrono::Utc;
use ndarray::Array2;
use std::path::Path;
use tracing::{info, warn};

struct Features {
    space: FeatureSpace,
    evaluator: Evaluator,
}

struct SimilarityModel {
    svd: FittedSvd,
    reduced: Array2<f64>,
    similarity: SimilarityMatrix,
}

/// Content-based recommender over one corpus. Building takes `&mut self`;
/// once built, `recommend` and `evaluate` only read.
pub struct MovieRecommender {
    features_config: FeatureConfig,
    reduction_config: ReductionConfig,
    recommendation_config: RecommendationConfig,
    corpus: Option<Corpus>,
    titles: TitleIndex,
    features: Option<Features>,
    model: Option<SimilarityModel>,
}

impl Default for MovieRecommender {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl MovieRecommender {
    pub fn new(config: &Config) -> Self {
        Self {
            features_config: config.features.clone(),
            reduction_config: config.reduction.clone(),
            recommendation_config: config.recommendation.clone(),
            corpus: None,
            titles: TitleIndex::default(),
            features: None,
            model: None,
        }
    }

    /// Runs ingestion, feature building and the similarity index in order.
    pub fn build<S: RecordSource>(config: &Config, source: S) -> Result<(Self, f64), RecommenderError> {
        let mut recommender = Self::new(config);
        recommender.ingest(source)?;
        recommender.build_features()?;
        let ratio = recommender.build_similarity(config.reduction.n_components)?;
        Ok((recommender, ratio))
    }

    pub fn build_from_path<P: AsRef<Path>>(config: &Config, path: P) -> Result<(Self, f64), RecommenderError> {
        let source = CsvSource::from_path(path)?;
        Self::build(config, source)
    }

    fn reset(&mut self) {
        self.corpus = None;
        self.titles = TitleIndex::default();
        self.features = None;
        self.model = None;
    }

    /// Replaces the corpus and drops all derived state.
    pub fn ingest<S: RecordSource>(&mut self, source: S) -> Result<usize, IngestionError> {
        self.reset();
        let corpus = ingest::ingest(source)?;
        self.titles = TitleIndex::build(&corpus.records);
        let size = corpus.len();
        self.corpus = Some(corpus);
        Ok(size)
    }

    pub fn build_features(&mut self) -> Result<(), FeatureBuildError> {
        let result = self.try_build_features();
        if let Err(e) = &result {
            warn!("Feature build failed, discarding corpus: {}", e);
            self.reset();
        }
        result
    }

    fn try_build_features(&mut self) -> Result<(), FeatureBuildError> {
        let corpus = self.corpus.as_ref().ok_or(FeatureBuildError::NotIngested)?;
        if !corpus.missing_columns.is_empty() {
            return Err(FeatureBuildError::MissingColumns(corpus.missing_columns.clone()));
        }
        if corpus.is_empty() {
            return Err(FeatureBuildError::EmptyCorpus);
        }

        info!("Starting preprocessing pipeline...");
        let space = build_feature_space(&corpus.records, &self.features_config);
        let evaluator = Evaluator::fit(&corpus.records);
        self.features = Some(Features { space, evaluator });
        self.model = None;
        info!("Preprocessing complete.");
        Ok(())
    }

    /// Reduces the combined features to `components` dimensions and builds
    /// the similarity index. Returns the explained variance ratio.
    pub fn build_similarity(&mut self, components: usize) -> Result<f64, FeatureBuildError> {
        let result = self.try_build_similarity(components);
        if let Err(e) = &result {
            warn!("Similarity build failed, discarding corpus: {}", e);
            self.reset();
        }
        result
    }

    fn try_build_similarity(&mut self, components: usize) -> Result<f64, FeatureBuildError> {
        if self.features.is_none() {
            info!("Features not processed. Running preprocessing pipeline...");
            self.try_build_features()?;
        }
        let features = self.features.as_ref().ok_or(FeatureBuildError::NotIngested)?;

        info!("Performing dimensionality reduction to {} components...", components);
        let reducer = TruncatedSvd {
            n_components: components,
            oversamples: self.reduction_config.oversamples,
            power_iterations: self.reduction_config.power_iterations,
            random_seed: self.reduction_config.random_seed,
        };
        let (svd, reduced) = reducer.fit_transform(&features.space.combined)?;
        let ratio = svd.total_explained_variance();
        info!(
            "Explained variance ratio: {:.2} ({} components)",
            ratio,
            svd.n_components()
        );

        info!("Computing similarity matrix...");
        let similarity = SimilarityMatrix::build(&reduced);
        info!("Similarity matrix computed.");

        self.model = Some(SimilarityModel {
            svd,
            reduced,
            similarity,
        });
        Ok(ratio)
    }

    pub fn records(&self) -> &[MovieRecord] {
        self.corpus
            .as_ref()
            .map(|c| c.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn feature_space(&self) -> Option<&FeatureSpace> {
        self.features.as_ref().map(|f| &f.space)
    }

    pub fn svd(&self) -> Option<&FittedSvd> {
        self.model.as_ref().map(|m| &m.svd)
    }

    pub fn reduced(&self) -> Option<&Array2<f64>> {
        self.model.as_ref().map(|m| &m.reduced)
    }

    pub fn similarity(&self) -> Option<&SimilarityMatrix> {
        self.model.as_ref().map(|m| &m.similarity)
    }

    /// Resolves `title` and ranks the other records by similarity.
    /// `choice` selects among records sharing the exact title.
    pub fn recommend(
        &self,
        title: &str,
        count: usize,
        choice: Option<usize>,
    ) -> Result<RecommendOutcome, RecommendError> {
        let model = self.model.as_ref().ok_or(RecommendError::NotReady)?;
        let records = self.records();

        let resolution = self.titles.resolve(
            records,
            title,
            choice,
            self.recommendation_config.match_policy,
            self.recommendation_config.max_suggestions,
        )?;

        let query_index = match resolution {
            Resolution::Resolved(index) => index,
            Resolution::Ambiguous(candidates) => {
                info!("Title '{}' matches {} movies", title, candidates.len());
                return Ok(RecommendOutcome::Ambiguous { candidates });
            }
            Resolution::NotFound(suggestions) => {
                info!("No movie found for '{}'", title);
                return Ok(RecommendOutcome::NotFound { suggestions });
            }
        };

        let query = &records[query_index];
        if !same_title(&query.title, title) {
            info!("Title not found exactly. Using closest match: '{}'", query.title);
        }

        let items = model
            .similarity
            .ranked_neighbors(query_index, count)
            .into_iter()
            .map(|(index, score)| {
                let record = &records[index];
                RecommendationItem {
                    index,
                    id: record.id.clone(),
                    title: record.title.clone(),
                    genres: record.genres.clone(),
                    vote_average: record.vote_average,
                    release_date: record.release_date.clone(),
                    similarity_score: score,
                    overview: record.overview.clone(),
                }
            })
            .collect();

        Ok(RecommendOutcome::Recommendations(RecommendationResult {
            query_index,
            query_title: query.title.clone(),
            items,
            generated_at: Utc::now(),
        }))
    }

    pub fn evaluate(
        &self,
        result: &RecommendationResult,
        query_index: usize,
    ) -> Result<EvaluationMetrics, EvaluationError> {
        let features = self.features.as_ref().ok_or(EvaluationError::NotReady)?;
        features.evaluator.evaluate(self.records(), result, query_index)
    }
}
