use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use movierec::utils::validation::{validate_count, validate_title};
use movierec::{
    init_tracing, AppState, Candidate, Config, EvaluationMetrics, InitializeOutcome, ModelState,
    RecommendError, RecommendOutcome, RecommendationItem, TitleSuggestion,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Movie recommendation HTTP server", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Build the model before accepting requests.
    #[arg(long)]
    initialize: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecommendRequest {
    title: String,
    count: Option<usize>,
    choice_index: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RecommendResponse {
    Success {
        movie: String,
        recommendations: Vec<RecommendationItem>,
        metrics: Option<EvaluationMetrics>,
    },
    MultipleMatches {
        message: String,
        matches: Vec<Candidate>,
    },
    NotFound {
        message: String,
        suggestions: Vec<TitleSuggestion>,
    },
    Error {
        message: String,
    },
}

impl RecommendResponse {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    model: ModelState,
    stats: HashMap<String, u64>,
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "movierec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn model_status(State(state): State<AppState>) -> Json<ApiResponse<StatusReport>> {
    Json(ApiResponse::success(StatusReport {
        model: state.model.state(),
        stats: state.model.serving_stats(),
    }))
}

async fn initialize(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<ModelState>>) {
    state.model.increment_stat("initialize_requests");

    match state.model.initialize().await {
        InitializeOutcome::AlreadyBuilding => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Model build already in progress".to_string())),
        ),
        InitializeOutcome::AlreadyReady => (StatusCode::OK, Json(ApiResponse::success(state.model.state()))),
        InitializeOutcome::Started => match state.model.state() {
            ModelState::Failed { error, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Model build failed: {}", error))),
            ),
            ready => (StatusCode::OK, Json(ApiResponse::success(ready))),
        },
    }
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> (StatusCode, Json<RecommendResponse>) {
    state.model.increment_stat("total_requests");

    let count = request
        .count
        .unwrap_or(state.config.recommendation.default_count);
    if let Err(e) = validate_title(&request.title).and_then(|_| validate_count(count)) {
        state.model.increment_stat("invalid_requests");
        return (StatusCode::BAD_REQUEST, Json(RecommendResponse::error(e.to_string())));
    }

    let recommender = match state.model.model() {
        Some(recommender) => recommender,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(RecommendResponse::error("Model not initialized")),
            )
        }
    };

    match recommender.recommend(&request.title, count, request.choice_index) {
        Ok(RecommendOutcome::Recommendations(result)) => {
            let metrics = match recommender.evaluate(&result, result.query_index) {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    error!("Failed to evaluate recommendations: {}", e);
                    None
                }
            };
            state.model.increment_stat("successful_requests");
            (
                StatusCode::OK,
                Json(RecommendResponse::Success {
                    movie: result.query_title,
                    recommendations: result.items,
                    metrics,
                }),
            )
        }
        Ok(RecommendOutcome::Ambiguous { candidates }) => {
            state.model.increment_stat("ambiguous_requests");
            (
                StatusCode::OK,
                Json(RecommendResponse::MultipleMatches {
                    message: format!("Multiple movies found with title '{}'", request.title),
                    matches: candidates,
                }),
            )
        }
        Ok(RecommendOutcome::NotFound { suggestions }) => {
            state.model.increment_stat("not_found_requests");
            (
                StatusCode::NOT_FOUND,
                Json(RecommendResponse::NotFound {
                    message: format!("Movie '{}' not found in dataset", request.title),
                    suggestions,
                }),
            )
        }
        Err(e @ RecommendError::InvalidChoice { .. }) => {
            (StatusCode::BAD_REQUEST, Json(RecommendResponse::error(e.to_string())))
        }
        Err(e) => {
            error!("Failed to get recommendations: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(RecommendResponse::error(e.to_string())))
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(model_status))
        .route("/initialize", post(initialize))
        .route("/recommend", post(recommend))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn serve(state: AppState, initialize_first: bool) -> anyhow::Result<()> {
    let addr = state.config.server.socket_addr()?;

    if initialize_first {
        state.model.initialize().await;
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = Config::load_or_default(&args.config)?;
    info!("Starting movie recommendation server with config: {:?}", config.server);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(serve(AppState::new(config), args.initialize))
}
