//! Axum HTTP surface: stateless dashboard endpoints over the loaded tables.
//!
//! Every endpoint is a read-only lookup against the shared [`EduContext`],
//! held as `Arc<EduContext>` across async handlers. Handlers route request
//! parameters into the query layer and rules engine, then serialize to JSON.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/student/quiz_detail` | Per-quiz max scores for one (student, class) |
//! | GET | `/api/student/{user_id}` | Student dashboard aggregate |
//! | POST | `/api/recommendation` | Study recommendation for one student |
//! | GET | `/api/admin/summary` | Student count, average GPA, at-risk count |
//! | GET | `/api/admin/classes` | Per-class student counts and averages |
//! | GET | `/api/admin/students_by_class` | Per-student stats within one class |
//!
//! Request-shape errors return 422 with every offending field listed under
//! `detail`; an unknown student id on the dashboard route returns 404; empty
//! filter results are a 200 with an empty list.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::queries;
use crate::recommend::{recommend, Recommendation};
use crate::types::EduContext;

pub type AppState = Arc<EduContext>;

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn create_router(ctx: Arc<EduContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/api/student/quiz_detail", get(handle_quiz_detail))
        .route("/api/student/{user_id}", get(handle_student_dashboard))
        .route("/api/recommendation", post(handle_recommendation))
        .route("/api/admin/summary", get(handle_admin_summary))
        .route("/api/admin/classes", get(handle_class_list))
        .route("/api/admin/students_by_class", get(handle_students_by_class))
        .layer(cors)
        .with_state(ctx)
}

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(serde_json::json!({ "detail": msg })))
}

// ── Request validation ──────────────────────────────────────────────

/// Accumulates every offending request field so one 422 names them all.
#[derive(Default)]
struct FieldErrors(Vec<(&'static str, &'static str, &'static str)>);

impl FieldErrors {
    fn push(&mut self, location: &'static str, field: &'static str, msg: &'static str) {
        self.0.push((location, field, msg));
    }

    fn into_response(self) -> ApiError {
        let detail: Vec<serde_json::Value> = self
            .0
            .iter()
            .map(|(location, field, msg)| {
                serde_json::json!({ "loc": [location, field], "msg": msg })
            })
            .collect();
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "detail": detail })),
        )
    }
}

fn query_int(
    params: &HashMap<String, String>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<i64> {
    match params.get(field) {
        None => {
            errors.push("query", field, "field required");
            None
        }
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push("query", field, "value is not a valid integer");
                None
            }
        },
    }
}

fn query_str<'a>(
    params: &'a HashMap<String, String>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match params.get(field) {
        Some(value) => Some(value.as_str()),
        None => {
            errors.push("query", field, "field required");
            None
        }
    }
}

fn body_int(body: &serde_json::Value, field: &'static str, errors: &mut FieldErrors) -> Option<i64> {
    match body.get(field) {
        None | Some(serde_json::Value::Null) => {
            errors.push("body", field, "field required");
            None
        }
        Some(value) => match value.as_i64() {
            Some(parsed) => Some(parsed),
            None => {
                errors.push("body", field, "value is not a valid integer");
                None
            }
        },
    }
}

fn body_str(
    body: &serde_json::Value,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match body.get(field) {
        None | Some(serde_json::Value::Null) => {
            errors.push("body", field, "field required");
            None
        }
        Some(value) => match value.as_str() {
            Some(parsed) => Some(parsed.to_string()),
            None => {
                errors.push("body", field, "value is not a valid string");
                None
            }
        },
    }
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_quiz_detail(
    State(ctx): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<queries::QuizDetail>>, ApiError> {
    let mut errors = FieldErrors::default();
    let user_id = query_int(&params, "user_id", &mut errors);
    let class_id = query_str(&params, "class_id", &mut errors);
    match (user_id, class_id) {
        (Some(user_id), Some(class_id)) => Ok(Json(queries::quiz_detail(&ctx, user_id, class_id))),
        _ => Err(errors.into_response()),
    }
}

async fn handle_student_dashboard(
    State(ctx): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<queries::StudentDashboard>, ApiError> {
    match queries::student_dashboard(&ctx, user_id) {
        Some(dashboard) => Ok(Json(dashboard)),
        None => Err(error_response(StatusCode::NOT_FOUND, "Student not found")),
    }
}

async fn handle_admin_summary(State(ctx): State<AppState>) -> Json<queries::AdminSummary> {
    Json(queries::admin_summary(&ctx))
}

async fn handle_class_list(State(ctx): State<AppState>) -> Json<Vec<queries::ClassStats>> {
    Json(queries::class_list(&ctx))
}

async fn handle_students_by_class(
    State(ctx): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<queries::ClassStudent>>, ApiError> {
    let mut errors = FieldErrors::default();
    match query_str(&params, "class_id", &mut errors) {
        Some(class_id) => Ok(Json(queries::students_by_class(&ctx, class_id))),
        None => Err(errors.into_response()),
    }
}

// ── POST handler ────────────────────────────────────────────────────

async fn handle_recommendation(
    State(ctx): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Recommendation>, ApiError> {
    let mut errors = FieldErrors::default();
    let user_id = body_int(&body, "user_id", &mut errors);
    let learning_style = body_str(&body, "learning_style", &mut errors);
    let interest = body_str(&body, "interest", &mut errors);
    match (user_id, learning_style, interest) {
        (Some(user_id), Some(learning_style), Some(interest)) => {
            Ok(Json(recommend(&ctx, user_id, &learning_style, &interest)))
        }
        _ => Err(errors.into_response()),
    }
}
