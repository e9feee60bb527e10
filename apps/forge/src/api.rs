//! # HTTP API
//!
//! REST and webhook boundary around one shared [`Orchestrator`].
//!
//! Every success is wrapped as `{success: true, data, timestamp}` and every
//! failure as `{success: false, error, timestamp}`. Validation failures map
//! to 400, unknown bridges/processors/primitives to 404, anything else to 500.
//!
//! The orchestrator does no locking of its own, so all handlers go through a
//! single `tokio::sync::Mutex`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use forge_core::{ForgeError, ForgeResult, Orchestrator, VERSION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Requests remembered by the history endpoint.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Entries returned by `/api/history` when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Entropy used by the harmony endpoint when the body omits it.
pub const DEFAULT_ENTROPY: f64 = 0.5;

/// Header carrying the server version on every response.
pub const VERSION_HEADER: &str = "x-forge-version";

// =============================================================================
// STATE
// =============================================================================

/// One entry of the request history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub timestamp: String,
    pub method: String,
    pub path: String,
    pub user_agent: String,
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub forge: Arc<Mutex<Orchestrator>>,
    pub history: Arc<Mutex<VecDeque<RequestRecord>>>,
    pub history_capacity: usize,
}

impl AppState {
    pub fn new(forge: Orchestrator) -> Self {
        Self {
            forge: Arc::new(Mutex::new(forge)),
            history: Arc::new(Mutex::new(VecDeque::new())),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Keep at most `capacity` requests (at least one).
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }
}

// =============================================================================
// ERRORS AND ENVELOPES
// =============================================================================

/// A [`ForgeError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ForgeError);

impl<E> From<E> for ApiError
where
    E: Into<ForgeError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ForgeError::Validation(_) => StatusCode::BAD_REQUEST,
            ForgeError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        let body = json!({
            "success": false,
            "error": self.0.to_string(),
            "timestamp": timestamp(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn success<T: Serialize>(data: &T) -> ApiResult {
    Ok(Json(json!({
        "success": true,
        "data": serde_json::to_value(data)?,
        "timestamp": timestamp(),
    })))
}

/// Unwrap a required JSON body.
fn required_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError(ForgeError::Validation(rejection.body_text())))
}

/// Unwrap an optional JSON body: no JSON content type means defaults.
fn optional_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(other) => Err(ApiError(ForgeError::Validation(other.body_text()))),
    }
}

/// Render a caller payload as the text a triadic processor votes on.
fn payload_text(payload: &Value) -> String {
    match payload {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// Body of `/api/process`, `/api/process/enhanced` and `/api/hooks/process`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessRequest {
    pub input: Option<String>,
    pub context: Option<Value>,
    pub webhook_id: Option<String>,
}

/// Body of the direct bridge / processor endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataRequest {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarmonyRequest {
    pub entropy: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/process", post(process))
        .route("/api/process/enhanced", post(process_enhanced))
        .route("/api/filing", get(filing))
        .route("/api/bridges", get(list_bridges))
        .route("/api/bridges/{bridge_id}/execute", post(execute_bridge))
        .route("/api/triadic", get(list_processors))
        .route("/api/triadic/{processor_id}/process", post(process_triadic))
        .route("/api/geometry", get(list_primitives))
        .route("/api/geometry/{primitive}/harmony", post(calculate_harmony))
        .route("/api/history", get(request_history))
        .route("/api/hooks/process", post(hook_process))
        .route("/api/hooks/status", get(hook_status).post(hook_status))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), track_request))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> ForgeResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, version = VERSION, "Nexus Forge API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

/// Record every request in the bounded history and stamp the version header.
async fn track_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let record = RequestRecord {
        timestamp: timestamp(),
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        user_agent: request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("Unknown")
            .to_string(),
    };
    {
        let mut history = state.history.lock().await;
        history.push_back(record);
        while history.len() > state.history_capacity {
            history.pop_front();
        }
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(VERSION_HEADER, HeaderValue::from_static(VERSION));
    response
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn index() -> Json<Value> {
    Json(json!({
        "name": "Nexus Forge API",
        "version": VERSION,
        "status": "operational",
        "timestamp": timestamp(),
        "endpoints": {
            "health": "/api/health",
            "status": "/api/status",
            "process": "/api/process",
            "process_enhanced": "/api/process/enhanced",
            "filing": "/api/filing",
            "bridges": "/api/bridges",
            "triadic": "/api/triadic",
            "geometry": "/api/geometry",
            "history": "/api/history",
            "hooks_process": "/api/hooks/process",
            "hooks_status": "/api/hooks/status",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let forge = state.forge.lock().await;
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "system_resonance": forge.system_resonance(),
        "active_bridges": forge.bridges().len(),
        "triadic_processors": forge.processors().len(),
    }))
}

async fn status(State(state): State<AppState>) -> ApiResult {
    let snapshot = state.forge.lock().await.get_system_status();
    success(&snapshot)
}

async fn process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult {
    let request = required_body(body)?;
    let input = request.input.ok_or_else(|| {
        ForgeError::Validation("Missing 'input' field in request body".to_string())
    })?;
    let result = state
        .forge
        .lock()
        .await
        .process_input(&input, request.context.as_ref())?;
    success(&result)
}

async fn process_enhanced(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult {
    let request = required_body(body)?;
    let input = request.input.ok_or_else(|| {
        ForgeError::Validation("Missing 'input' field in request body".to_string())
    })?;
    let result = state.forge.lock().await.process_enhanced_input(&input)?;
    success(&result)
}

async fn filing(State(state): State<AppState>) -> ApiResult {
    let counts = state.forge.lock().await.filing().counts();
    success(&counts)
}

async fn list_bridges(State(state): State<AppState>) -> Json<Value> {
    let forge = state.forge.lock().await;
    let mut data = Map::new();
    for bridge in forge.bridges().iter() {
        data.insert(
            bridge.bridge_id.clone(),
            json!({
                "type": bridge.bridge_type,
                "source": bridge.source_component,
                "target": bridge.target_component,
                "function": bridge.bridge_function,
                "execution_count": bridge.execution_count(),
                "success_rate": bridge.success_rate(),
                "created_at": bridge.created_at(),
            }),
        );
    }
    let total = data.len();
    Json(json!({
        "success": true,
        "data": data,
        "total_bridges": total,
        "timestamp": timestamp(),
    }))
}

async fn execute_bridge(
    State(state): State<AppState>,
    Path(bridge_id): Path<String>,
    body: Result<Json<DataRequest>, JsonRejection>,
) -> ApiResult {
    let request = optional_body(body)?;
    let record = state
        .forge
        .lock()
        .await
        .execute_bridge(&bridge_id, &request.data)?;
    success(&record)
}

async fn list_processors(State(state): State<AppState>) -> Json<Value> {
    let forge = state.forge.lock().await;
    let mut data = Map::new();
    for (id, processor) in forge.processors() {
        data.insert(
            id.clone(),
            json!({
                "threshold": processor.consensus_threshold(),
                "elements_count": processor.elements().len(),
                "active_elements": processor.active_count(),
                "elements": processor.elements(),
            }),
        );
    }
    let total = data.len();
    Json(json!({
        "success": true,
        "data": data,
        "total_processors": total,
        "timestamp": timestamp(),
    }))
}

async fn process_triadic(
    State(state): State<AppState>,
    Path(processor_id): Path<String>,
    body: Result<Json<DataRequest>, JsonRejection>,
) -> ApiResult {
    let request = optional_body(body)?;
    let input = payload_text(&request.data);
    let result = state
        .forge
        .lock()
        .await
        .process_triadic(&processor_id, &input)?;
    success(&result)
}

async fn list_primitives(State(state): State<AppState>) -> Json<Value> {
    let forge = state.forge.lock().await;
    let mut data = Map::new();
    for (name, primitive) in forge.primitives() {
        data.insert(
            name.clone(),
            json!({
                "vertex_count": primitive.vertex_count,
                "golden_ratio": primitive.golden_ratio,
                "sacred_frequencies": primitive.sacred_frequencies,
                "resonance_pattern_length": primitive.resonance_pattern.len(),
                "optimal_entropy": primitive.optimal_entropy(),
            }),
        );
    }
    let total = data.len();
    Json(json!({
        "success": true,
        "data": data,
        "total_primitives": total,
        "timestamp": timestamp(),
    }))
}

async fn calculate_harmony(
    State(state): State<AppState>,
    Path(primitive): Path<String>,
    body: Result<Json<HarmonyRequest>, JsonRejection>,
) -> ApiResult {
    let request = optional_body(body)?;
    let entropy = request.entropy.unwrap_or(DEFAULT_ENTROPY);
    let harmony = state
        .forge
        .lock()
        .await
        .calculate_harmony(&primitive, entropy)?;
    success(&json!({
        "primitive": primitive,
        "input_entropy": entropy,
        "harmony_score": round3(harmony),
    }))
}

async fn request_history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Json<Value> {
    // An unparseable limit falls back to the default.
    let limit = params
        .ok()
        .and_then(|Query(p)| p.limit)
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(state.history_capacity);
    let history = state.history.lock().await;
    let skip = history.len().saturating_sub(limit);
    let recent: Vec<&RequestRecord> = history.iter().skip(skip).collect();
    Json(json!({
        "success": true,
        "data": recent,
        "total_requests": history.len(),
        "timestamp": timestamp(),
    }))
}

async fn hook_process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult {
    let request = required_body(body)?;
    let input = request
        .input
        .ok_or_else(|| ForgeError::Validation("Invalid webhook payload".to_string()))?;
    let result = state
        .forge
        .lock()
        .await
        .process_input(&input, request.context.as_ref())?;
    let webhook_id = request.webhook_id.unwrap_or_else(|| "unknown".to_string());
    Ok(Json(json!({
        "success": true,
        "webhook_id": webhook_id,
        "response": result.response,
        "intent": result.intent,
        "concepts": result.concepts,
        "processing_time_ms": result.processing_time_ms,
        "timestamp": timestamp(),
    })))
}

async fn hook_status(State(state): State<AppState>) -> Json<Value> {
    let resonance = state.forge.lock().await.system_resonance();
    Json(json!({
        "success": true,
        "status": "operational",
        "system_resonance": resonance,
        "timestamp": timestamp(),
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
            "timestamp": timestamp(),
        })),
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn round3_rounds_half_away() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.9996), 1.0);
    }

    #[test]
    fn payload_text_forms() {
        assert_eq!(payload_text(&Value::Null), "");
        assert_eq!(payload_text(&json!("plain")), "plain");
        assert_eq!(payload_text(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn api_error_status_mapping() {
        let bad = ApiError(ForgeError::Validation("x".to_string())).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError(ForgeError::not_found(
            forge_core::RegistryKind::Bridge,
            "nope",
        ))
        .into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let internal = ApiError(ForgeError::Internal("boom".to_string())).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn history_capacity_never_zero() {
        let state = AppState::new(Orchestrator::new().unwrap()).with_history_capacity(0);
        assert_eq!(state.history_capacity, 1);
    }
}
