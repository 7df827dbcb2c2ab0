use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{NewProduct, ProductId};
use super::repository::ProductRepository;
use super::service::{ProductService, ProductServiceError};
use crate::repository::RepositoryError;

/// Public catalog reads.
pub fn product_router<R>(service: Arc<ProductService<R>>) -> Router
where
    R: ProductRepository + 'static,
{
    Router::new()
        .route("/api/v1/products", get(list_products_handler::<R>))
        .route("/api/v1/products/:product_id", get(product_handler::<R>))
        .with_state(service)
}

/// Catalog writes; callers put these behind authentication.
pub fn product_admin_router<R>(service: Arc<ProductService<R>>) -> Router
where
    R: ProductRepository + 'static,
{
    Router::new()
        .route("/api/v1/products", post(create_product_handler::<R>))
        .with_state(service)
}

pub(crate) async fn list_products_handler<R>(
    State(service): State<Arc<ProductService<R>>>,
) -> Response
where
    R: ProductRepository + 'static,
{
    match service.list() {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn product_handler<R>(
    State(service): State<Arc<ProductService<R>>>,
    Path(product_id): Path<u32>,
) -> Response
where
    R: ProductRepository + 'static,
{
    match service.get(ProductId(product_id)) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_product_handler<R>(
    State(service): State<Arc<ProductService<R>>>,
    Json(product): Json<NewProduct>,
) -> Response
where
    R: ProductRepository + 'static,
{
    match service.create(product) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ProductServiceError) -> Response {
    let status = match &error {
        ProductServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
        ProductServiceError::NotFound(_)
        | ProductServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ProductServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ProductServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
