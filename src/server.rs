//! HTTP API server.
//!
//! Exposes summarization, chunking, and text statistics as a JSON API so
//! browser front-ends and other tools can use one shared model handle and
//! result cache.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/presets` | Density presets and the default |
//! | `POST` | `/stats` | Character/word counts and time estimate |
//! | `POST` | `/chunk` | Split text into chunks |
//! | `POST` | `/summarize` | Summarize text |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "invalid_input", "message": "Please enter valid text to summarize" } }
//! ```
//!
//! Error codes: `bad_request` (400), `invalid_input` (400),
//! `model_unavailable` (503), `summary_failed` (502), `inference_error` (502),
//! `cancelled` (408).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front-end
//! can be served from anywhere.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use condense_core::chunk::chunk_text;
use condense_core::{LengthParams, SummarizeError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{Config, Density};
use crate::progress::NoProgress;
use crate::stats::TextStats;
use crate::summarize::{SummaryReport, SummaryService};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: Arc<SummaryService>,
}

/// Build the router around an existing service.
pub fn router(service: Arc<SummaryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/presets", get(handle_presets))
        .route("/stats", post(handle_stats))
        .route("/chunk", post(handle_chunk))
        .route("/summarize", post(handle_summarize))
        .layer(cors)
        .with_state(AppState { service })
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated. Returns an error if binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let service = Arc::new(SummaryService::new(config.clone()));
    let app = router(service);

    println!("condense server listening on http://{}", bind_addr);
    tracing::info!(bind = %bind_addr, provider = %config.model.provider, "server starting");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SummarizeError> for AppError {
    fn from(err: SummarizeError) -> Self {
        let status = match &err {
            SummarizeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SummarizeError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SummarizeError::AllChunksFailed { .. } | SummarizeError::Inference(_) => {
                StatusCode::BAD_GATEWAY
            }
            SummarizeError::Cancelled { .. } => StatusCode::REQUEST_TIMEOUT,
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /presets ============

#[derive(Serialize)]
struct PresetInfo {
    name: Density,
    #[serde(flatten)]
    params: LengthParams,
}

#[derive(Serialize)]
struct PresetsResponse {
    default: Density,
    presets: Vec<PresetInfo>,
}

async fn handle_presets(State(state): State<AppState>) -> Json<PresetsResponse> {
    let presets = &state.service.config().presets;
    Json(PresetsResponse {
        default: presets.default,
        presets: Density::ALL
            .iter()
            .map(|&name| PresetInfo {
                name,
                params: presets.params(name),
            })
            .collect(),
    })
}

// ============ POST /stats ============

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

#[derive(Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: TextStats,
    below_recommended: bool,
}

async fn handle_stats(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Json<StatsResponse> {
    let stats = TextStats::of(&req.text);
    let recommended = state.service.config().input.recommended_chars;
    Json(StatsResponse {
        below_recommended: stats.below_recommended(recommended),
        stats,
    })
}

// ============ POST /chunk ============

#[derive(Deserialize)]
struct ChunkRequest {
    text: String,
    #[serde(default)]
    max_chunk_size: Option<usize>,
}

#[derive(Serialize)]
struct ChunkInfo {
    index: usize,
    size: usize,
    text: String,
}

#[derive(Serialize)]
struct ChunkResponse {
    max_chunk_size: usize,
    count: usize,
    chunks: Vec<ChunkInfo>,
}

async fn handle_chunk(
    State(state): State<AppState>,
    Json(req): Json<ChunkRequest>,
) -> Result<Json<ChunkResponse>, AppError> {
    let max = req
        .max_chunk_size
        .unwrap_or(state.service.config().chunking.max_chunk_size);
    if max == 0 {
        return Err(bad_request("max_chunk_size must be > 0"));
    }

    let chunks: Vec<ChunkInfo> = chunk_text(&req.text, max)
        .into_iter()
        .map(|c| ChunkInfo {
            index: c.index,
            size: c.size(),
            text: c.text,
        })
        .collect();

    Ok(Json(ChunkResponse {
        max_chunk_size: max,
        count: chunks.len(),
        chunks,
    }))
}

// ============ POST /summarize ============

#[derive(Deserialize)]
struct SummarizeRequest {
    text: String,
    #[serde(default)]
    density: Option<Density>,
}

async fn handle_summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummaryReport>, AppError> {
    let report = state
        .service
        .summarize(&req.text, req.density, &NoProgress, None)
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelHandle;
    use crate::provider::LeadSummarizer;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn lead_app() -> Router {
        let service =
            SummaryService::with_model(Config::default(), ModelHandle::ready(Arc::new(LeadSummarizer)));
        router(Arc::new(service))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (status, body) = send(lead_app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn presets_lists_all_densities() {
        let (status, body) = send(lead_app(), "GET", "/presets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default"], "balanced");
        assert_eq!(body["presets"][0]["name"], "concise");
        assert_eq!(body["presets"][0]["max_length"], 80);
        assert_eq!(body["presets"][2]["min_length"], 200);
    }

    #[tokio::test]
    async fn stats_counts_words() {
        let (status, body) =
            send(lead_app(), "POST", "/stats", Some(json!({ "text": "one two three" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"], 3);
        assert_eq!(body["characters"], 13);
        assert_eq!(body["below_recommended"], true);
    }

    #[tokio::test]
    async fn chunk_uses_requested_size() {
        let text = "Hello world. ".repeat(200);
        let (status, body) = send(
            lead_app(),
            "POST",
            "/chunk",
            Some(json!({ "text": text, "max_chunk_size": 1024 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["count"].as_u64().unwrap() >= 2);
        for chunk in body["chunks"].as_array().unwrap() {
            assert!(chunk["size"].as_u64().unwrap() <= 1229);
        }
    }

    #[tokio::test]
    async fn chunk_rejects_zero_size() {
        let (status, body) = send(
            lead_app(),
            "POST",
            "/chunk",
            Some(json!({ "text": "abc", "max_chunk_size": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn summarize_returns_report() {
        let text = "The first sentence is here. The second sentence follows it. A third one ends the text.";
        let (status, body) = send(
            lead_app(),
            "POST",
            "/summarize",
            Some(json!({ "text": text, "density": "concise" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], text);
        assert_eq!(body["density"], "concise");
        assert_eq!(body["direct"], true);
        assert_eq!(body["model"], "lead");
    }

    #[tokio::test]
    async fn summarize_empty_text_is_bad_request() {
        let (status, body) =
            send(lead_app(), "POST", "/summarize", Some(json!({ "text": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_input");
        assert_eq!(body["error"]["message"], "Please enter valid text to summarize");
    }

    #[tokio::test]
    async fn disabled_model_is_service_unavailable() {
        let mut config = Config::default();
        config.model.provider = "disabled".to_string();
        let app = router(Arc::new(SummaryService::new(config)));
        let text = "A reasonably long sentence that passes validation easily. ".repeat(3);

        let (status, body) = send(app, "POST", "/summarize", Some(json!({ "text": text }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "model_unavailable");
        assert_eq!(
            body["error"]["message"],
            "Model unavailable - please try again later"
        );
    }
}
