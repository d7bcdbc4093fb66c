use crate::config::Config;
use crate::error::RecommenderError;
use crate::ingest::RecordSource;
use crate::services::recommendation::MovieRecommender;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Lifecycle of the shared model as seen by the serving layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelState {
    Uninitialized,
    Building {
        started_at: DateTime<Utc>,
    },
    Ready {
        ready_at: DateTime<Utc>,
        corpus_size: usize,
        explained_variance: f64,
    },
    Failed {
        error: String,
        failed_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeOutcome {
    Started,
    AlreadyBuilding,
    AlreadyReady,
}

/// Owns the recommender behind the Uninitialized → Building → Ready/Failed
/// state machine. Nothing is published until a build fully succeeds; after
/// that readers share an immutable `Arc` without further locking.
pub struct ModelHandle {
    config: Arc<Config>,
    state: RwLock<ModelState>,
    model: RwLock<Option<Arc<MovieRecommender>>>,
    serving_stats: DashMap<String, u64>,
}

impl ModelHandle {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            state: RwLock::new(ModelState::Uninitialized),
            model: RwLock::new(None),
            serving_stats: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> ModelState {
        self.state.read().clone()
    }

    /// The built recommender, once Ready.
    pub fn model(&self) -> Option<Arc<MovieRecommender>> {
        self.model.read().clone()
    }

    /// Moves Uninitialized/Failed to Building. Returns how the request was
    /// handled; only `Started` obliges the caller to run a build.
    pub fn begin_build(&self) -> InitializeOutcome {
        let mut state = self.state.write();
        match *state {
            ModelState::Building { .. } => InitializeOutcome::AlreadyBuilding,
            ModelState::Ready { .. } => InitializeOutcome::AlreadyReady,
            ModelState::Uninitialized | ModelState::Failed { .. } => {
                *state = ModelState::Building { started_at: Utc::now() };
                InitializeOutcome::Started
            }
        }
    }

    /// Publishes the outcome of a build started with [`Self::begin_build`].
    pub fn finish_build(&self, result: Result<(MovieRecommender, f64), RecommenderError>) {
        match result {
            Ok((recommender, explained_variance)) => {
                let corpus_size = recommender.len();
                *self.model.write() = Some(Arc::new(recommender));
                *self.state.write() = ModelState::Ready {
                    ready_at: Utc::now(),
                    corpus_size,
                    explained_variance,
                };
                info!("Recommendation system initialized with {} movies", corpus_size);
            }
            Err(e) => {
                error!("Error initializing model: {}", e);
                *self.model.write() = None;
                *self.state.write() = ModelState::Failed {
                    error: e.to_string(),
                    failed_at: Utc::now(),
                };
            }
        }
    }

    /// Builds synchronously from `source`. Used by the blocking build task
    /// and by callers without a runtime.
    pub fn initialize_with<S: RecordSource>(&self, source: S) -> InitializeOutcome {
        let outcome = self.begin_build();
        if outcome == InitializeOutcome::Started {
            info!("Initializing recommendation system...");
            self.finish_build(MovieRecommender::build(&self.config, source));
        }
        outcome
    }

    /// Builds from the configured CSV path on a blocking thread.
    pub async fn initialize(self: &Arc<Self>) -> InitializeOutcome {
        let outcome = self.begin_build();
        if outcome != InitializeOutcome::Started {
            return outcome;
        }

        info!("Initializing recommendation system from {}", self.config.data.movies_path);
        let handle = Arc::clone(self);
        let build = tokio::task::spawn_blocking(move || {
            let result = MovieRecommender::build_from_path(&handle.config, &handle.config.data.movies_path);
            handle.finish_build(result);
        })
        .await;

        if let Err(e) = build {
            error!("Build task aborted: {}", e);
            *self.state.write() = ModelState::Failed {
                error: format!("build task aborted: {}", e),
                failed_at: Utc::now(),
            };
        }
        outcome
    }

    pub fn increment_stat(&self, key: &str) {
        *self.serving_stats.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn serving_stats(&self) -> HashMap<String, u64> {
        self.serving_stats
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
