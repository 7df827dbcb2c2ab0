use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{NewEvaluation, NewStudent, StudentId};
use super::repository::StudentRepository;
use super::service::{GradeService, GradeServiceError};
use crate::repository::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePayload {
    pub attended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusOverridePayload {
    #[serde(default)]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusPolicyPayload {
    pub all_years_teachers: bool,
}

/// Router builder exposing the students/evaluations endpoints.
pub fn grading_router<R>(service: Arc<GradeService<R>>) -> Router
where
    R: StudentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/students",
            get(list_students_handler::<R>).post(register_student_handler::<R>),
        )
        .route("/api/v1/students/:student_id", get(student_handler::<R>))
        .route(
            "/api/v1/students/:student_id/evaluations",
            get(evaluations_handler::<R>).post(record_evaluation_handler::<R>),
        )
        .route(
            "/api/v1/students/:student_id/attendance",
            put(attendance_handler::<R>),
        )
        .route(
            "/api/v1/students/:student_id/bonus",
            put(bonus_override_handler::<R>),
        )
        .route(
            "/api/v1/students/:student_id/final-grade",
            get(final_grade_handler::<R>),
        )
        .route(
            "/api/v1/grading/policy",
            get(policy_handler::<R>).put(update_policy_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn list_students_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.list_students() {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_student_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Json(student): Json<NewStudent>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.register_student(student) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn student_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Path(student_id): Path<u32>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.student(StudentId(student_id)) {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluations_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Path(student_id): Path<u32>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.evaluations(StudentId(student_id)) {
        Ok(evaluations) => (StatusCode::OK, Json(evaluations)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_evaluation_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Path(student_id): Path<u32>,
    Json(evaluation): Json<NewEvaluation>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.record_evaluation(StudentId(student_id), evaluation) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attendance_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Path(student_id): Path<u32>,
    Json(payload): Json<AttendancePayload>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.set_attendance(StudentId(student_id), payload.attended) {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bonus_override_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Path(student_id): Path<u32>,
    Json(payload): Json<BonusOverridePayload>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.set_bonus_override(StudentId(student_id), payload.points) {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn final_grade_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Path(student_id): Path<u32>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.final_grade(StudentId(student_id)) {
        Ok(breakdown) => (StatusCode::OK, Json(breakdown)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn policy_handler<R>(State(service): State<Arc<GradeService<R>>>) -> Response
where
    R: StudentRepository + 'static,
{
    let payload = BonusPolicyPayload {
        all_years_teachers: service.bonus_policy(),
    };
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn update_policy_handler<R>(
    State(service): State<Arc<GradeService<R>>>,
    Json(payload): Json<BonusPolicyPayload>,
) -> Response
where
    R: StudentRepository + 'static,
{
    service.set_bonus_policy(payload.all_years_teachers);
    (StatusCode::OK, Json(payload)).into_response()
}

fn error_response(error: GradeServiceError) -> Response {
    let status = match &error {
        GradeServiceError::InvalidStudent(_) | GradeServiceError::Grade(_) => {
            StatusCode::BAD_REQUEST
        }
        GradeServiceError::StudentNotFound(_)
        | GradeServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        GradeServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        GradeServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
