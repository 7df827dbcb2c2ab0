use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{CharacterId, NewCharacter, NewComment};
use super::repository::{CharacterRepository, CommentRepository};
use super::service::{CharacterService, CharacterServiceError, CommentService};
use crate::repository::RepositoryError;

pub fn character_router<R>(service: Arc<CharacterService<R>>) -> Router
where
    R: CharacterRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/characters",
            get(list_characters_handler::<R>).post(create_character_handler::<R>),
        )
        .with_state(service)
}

pub fn comment_router<C, R>(service: Arc<CommentService<C, R>>) -> Router
where
    C: CommentRepository + 'static,
    R: CharacterRepository + 'static,
{
    Router::new()
        .route("/api/v1/comments", post(add_comment_handler::<C, R>))
        .route(
            "/api/v1/comments/:character_id",
            get(comments_handler::<C, R>),
        )
        .with_state(service)
}

pub(crate) async fn list_characters_handler<R>(
    State(service): State<Arc<CharacterService<R>>>,
) -> Response
where
    R: CharacterRepository + 'static,
{
    match service.list_characters() {
        Ok(characters) => (StatusCode::OK, Json(characters)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_character_handler<R>(
    State(service): State<Arc<CharacterService<R>>>,
    Json(character): Json<NewCharacter>,
) -> Response
where
    R: CharacterRepository + 'static,
{
    match service.create_character(character) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_comment_handler<C, R>(
    State(service): State<Arc<CommentService<C, R>>>,
    Json(comment): Json<NewComment>,
) -> Response
where
    C: CommentRepository + 'static,
    R: CharacterRepository + 'static,
{
    match service.add_comment(comment) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn comments_handler<C, R>(
    State(service): State<Arc<CommentService<C, R>>>,
    Path(character_id): Path<u32>,
) -> Response
where
    C: CommentRepository + 'static,
    R: CharacterRepository + 'static,
{
    match service.comments_for(CharacterId(character_id)) {
        Ok(comments) => (StatusCode::OK, Json(comments)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CharacterServiceError) -> Response {
    let status = match &error {
        CharacterServiceError::Invalid(_) | CharacterServiceError::CharacterNotFound(_) => {
            StatusCode::BAD_REQUEST
        }
        CharacterServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CharacterServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CharacterServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
