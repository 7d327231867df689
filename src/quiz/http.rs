use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::GuessQuantity;
use super::explainer::Explainer;
use super::registry::{QuizService, QuizServiceError, SessionId, SessionSpec};
use super::session::{SessionSnapshot, Submission};

/// Router exposing the quiz API for the rendering layer.
pub fn quiz_router(service: Arc<QuizService>) -> Router {
    Router::new()
        .route("/api/v1/quiz/sessions", post(create_session_handler))
        .route("/api/v1/quiz/sessions/:session_id", get(snapshot_handler))
        .route(
            "/api/v1/quiz/sessions/:session_id/guesses",
            post(guess_handler),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/advance",
            post(advance_handler),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/reset",
            post(reset_handler),
        )
        .route("/api/v1/quiz/explainer", get(explainer_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSessionRequest {
    #[serde(flatten)]
    pub(crate) spec: SessionSpec,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionResponse {
    pub(crate) session_id: SessionId,
    pub(crate) snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuessRequest {
    pub(crate) quantity: GuessQuantity,
    pub(crate) value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GuessResponse {
    pub(crate) outcome: Submission,
    pub(crate) snapshot: SessionSnapshot,
}

pub(crate) async fn create_session_handler(
    State(service): State<Arc<QuizService>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Response {
    if payload.spec.session_length == Some(0) {
        let body = json!({ "error": "session_length must be at least 1" });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    match service.create(payload.spec) {
        Ok((session_id, snapshot)) => (
            StatusCode::CREATED,
            Json(CreateSessionResponse {
                session_id,
                snapshot,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn snapshot_handler(
    State(service): State<Arc<QuizService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.snapshot(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn guess_handler(
    State(service): State<Arc<QuizService>>,
    Path(session_id): Path<String>,
    Json(payload): Json<GuessRequest>,
) -> Response {
    match service.submit_guess(&SessionId(session_id), payload.quantity, &payload.value) {
        Ok((outcome, snapshot)) => {
            (StatusCode::OK, Json(GuessResponse { outcome, snapshot })).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn advance_handler(
    State(service): State<Arc<QuizService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.advance(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler(
    State(service): State<Arc<QuizService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.reset(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn explainer_handler() -> Json<Explainer> {
    Json(Explainer::standard())
}

fn error_response(err: QuizServiceError) -> Response {
    let status = match &err {
        QuizServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        QuizServiceError::EmptyDataset(_) | QuizServiceError::RegistryPoisoned => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = json!({ "error": err.to_string() });
    (status, Json(body)).into_response()
}
