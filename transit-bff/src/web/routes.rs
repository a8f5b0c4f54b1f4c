//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, error, warn};

use crate::chat::{ChatRequest, ChatResponse, PlanRequest, RelayError};
use crate::config::AllowedOrigins;
use crate::stops::{Stop, StopQuery, StopsError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops", get(list_stops))
        .route("/chat", post(chat))
        .route("/plan", post(plan))
        .layer(cors_layer(origins))
        .with_state(state)
}

/// CORS for browser clients: any method and header, origins as configured,
/// credentials allowed.
///
/// Credentialed responses may not use `*`, so "any" echoes the request's
/// origin, method and headers back instead.
fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::mirror_request(),
        AllowedOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Stops within optional bounds, in feed order.
///
/// `limit` defaults to 5000; zero or negative returns every match.
async fn list_stops(
    State(state): State<AppState>,
    Query(query): Query<StopQuery>,
) -> Result<Json<Vec<Stop>>, AppError> {
    let stops = state.stops.query(&query).await?;
    Ok(Json(stops))
}

/// Relay a conversation to the LLM.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let content = state
        .llm
        .complete(&req.messages, req.temperature, req.max_tokens)
        .await?;
    Ok(Json(ChatResponse { content }))
}

/// Ask the trip planner.
async fn plan(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let content = state
        .llm
        .plan(&req.prompt, req.temperature, req.max_tokens)
        .await?;
    Ok(Json(ChatResponse { content }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Pass an upstream status through unchanged.
    Upstream { status: StatusCode, message: String },
    Internal { message: String },
}

impl From<StopsError> for AppError {
    fn from(e: StopsError) -> Self {
        debug!(cause = ?e.cause(), "Stop list unavailable");
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Upstream { status, body } => AppError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message: body,
            },
            other => AppError::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Upstream { status, message } => (status, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        error!(%status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
