use crate::models::Candidate;

/// Failure to read or parse the record source. Fatal to initialization.
#[derive(thiserror::Error, Debug)]
pub enum IngestionError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV source: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source has no 'title' column")]
    MissingTitleColumn,
}

/// Failure while fitting encoders, the reducer or the similarity index.
#[derive(thiserror::Error, Debug)]
pub enum FeatureBuildError {
    #[error("No corpus has been ingested")]
    NotIngested,

    #[error("Corpus is empty")]
    EmptyCorpus,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Combined feature space has no columns")]
    EmptyFeatureSpace,

    #[error("Number of components must be positive")]
    InvalidComponents,

    #[error("Decomposition failed: {0}")]
    Decomposition(String),
}

#[derive(thiserror::Error, Debug)]
pub enum RecommendError {
    #[error("Similarity index has not been built")]
    NotReady,

    #[error("Choice {choice} is out of range for {} candidates", .candidates.len())]
    InvalidChoice {
        choice: usize,
        candidates: Vec<Candidate>,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    #[error("Features have not been built")]
    NotReady,

    #[error("Query index {0} is outside the corpus")]
    QueryOutOfRange(usize),

    #[error("Recommended index {0} is outside the corpus")]
    RecommendationOutOfRange(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum RecommenderError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    FeatureBuild(#[from] FeatureBuildError),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
