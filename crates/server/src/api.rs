//! HTTP API for crop predictions, health checks and Prometheus metrics

use crate::config::ServerConfig;
use crate::error::{ApiError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use crop_lib::{
    predictor::{ForestPredictor, Predictor},
    HealthResponse, ServiceMetrics, SoilFeatures, StatusResponse, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Version reported by `GET /`
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

const PREDICT_MODEL_MISSING: &str = "Model not loaded. Please train model first.";
const CROPS_MODEL_MISSING: &str = "Model not loaded";

/// Shared application state
///
/// The predictor is resolved once at startup and never replaced.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Option<Arc<dyn Predictor>>,
    pub model_path: PathBuf,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        predictor: Option<Arc<dyn Predictor>>,
        model_path: impl Into<PathBuf>,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        let classes = predictor.as_ref().map_or(0, |p| p.classes().len());
        metrics.set_model_state(predictor.is_some(), classes);
        Self {
            predictor,
            model_path: model_path.into(),
            metrics,
            logger,
        }
    }

    /// Read the artifact once; a missing or unreadable file leaves the
    /// service running without a model
    pub fn load(
        model_path: impl Into<PathBuf>,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        let model_path = model_path.into();
        let path_str = model_path.display().to_string();

        let predictor: Option<Arc<dyn Predictor>> = if !model_path.exists() {
            logger.log_model_unavailable(&path_str, "model file not found");
            None
        } else {
            match ForestPredictor::load(&model_path) {
                Ok(predictor) => {
                    let artifact = predictor.artifact();
                    logger.log_model_loaded(
                        &path_str,
                        artifact.forest.classes().len(),
                        artifact.forest.n_trees(),
                        artifact.held_out_accuracy,
                    );
                    Some(Arc::new(predictor) as Arc<dyn Predictor>)
                }
                Err(e) => {
                    logger.log_model_unavailable(&path_str, &e.to_string());
                    None
                }
            }
        };

        Self::new(predictor, model_path, metrics, logger)
    }

    pub fn model_loaded(&self) -> bool {
        self.predictor.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: String,
    pub confidence: f64,
    pub input_data: Value,
}

#[derive(Debug, Serialize)]
pub struct CropsResponse {
    pub success: bool,
    pub total_crops: usize,
    pub crops: Vec<String>,
}

/// API status
async fn home(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse::new(API_VERSION, state.model_loaded()))
}

/// Detailed health check
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::new(&state.model_path, state.model_loaded()))
}

/// Crop prediction
async fn predict(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let result = run_prediction(&state, body).await;
    if let Err(e) = &result {
        state.metrics.inc_prediction_errors(e.kind());
    }
    result.map(Json)
}

async fn run_prediction(
    state: &AppState,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<PredictResponse> {
    let Json(body) = body
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::InvalidRequest("Request body must be a JSON object".to_string()))?;

    let features = SoilFeatures::from_json_map(fields);
    if let Err(errors) = &features {
        if !errors.missing.is_empty() {
            return Err(ApiError::MissingFields(errors.missing_message()));
        }
    }

    let predictor = state
        .predictor
        .clone()
        .ok_or(ApiError::ModelNotLoaded(PREDICT_MODEL_MISSING))?;

    let features = features.map_err(|errors| ApiError::InvalidFields(errors.invalid_message()))?;

    let start = Instant::now();
    let prediction = tokio::task::spawn_blocking(move || predictor.predict(&features))
        .await
        .map_err(|e| {
            state.logger.log_prediction_failure(&e.to_string());
            ApiError::Internal(format!("inference task failed: {}", e))
        })?
        .map_err(|e| {
            state.logger.log_prediction_failure(&e.to_string());
            ApiError::Internal(e.to_string())
        })?;
    state
        .metrics
        .observe_prediction_latency(start.elapsed().as_secs_f64());

    state.metrics.inc_predictions(&prediction.crop);
    state
        .logger
        .log_prediction(&features, &prediction.crop, prediction.confidence);

    Ok(PredictResponse {
        success: true,
        prediction: prediction.crop,
        confidence: prediction.confidence,
        input_data: body,
    })
}

/// Every crop the loaded model can predict
async fn crops(State(state): State<Arc<AppState>>) -> Result<Json<CropsResponse>> {
    let predictor = state
        .predictor
        .as_ref()
        .ok_or(ApiError::ModelNotLoaded(CROPS_MODEL_MISSING))?;

    let crops = predictor.classes().to_vec();
    Ok(Json(CropsResponse {
        success: true,
        total_crops: crops.len(),
        crops,
    }))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return ApiError::Internal(format!("failed to encode metrics: {}", e)).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/crops", get(crops))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// CORS for browser clients: any origin unless one is configured
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Ok(match origin {
        Some(origin) if !origin.is_empty() && origin != "*" => {
            layer.allow_origin(origin.parse::<HeaderValue>()?)
        }
        _ => layer.allow_origin(Any),
    })
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state).layer(cors_layer(config.cors_origin.as_deref())?);

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
