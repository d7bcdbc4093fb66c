pub mod algorithms;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{Config, MatchPolicy};
pub use error::{EvaluationError, FeatureBuildError, IngestionError, RecommendError, RecommenderError};
pub use ingest::{Corpus, CsvSource, RecordSource};
pub use models::*;
pub use services::recommendation::MovieRecommender;
pub use services::serving::{InitializeOutcome, ModelHandle, ModelState};

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<ModelHandle>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let model = Arc::new(ModelHandle::new(config.clone()));
        Self { config, model }
    }
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
