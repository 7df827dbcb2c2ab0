use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use gradebook::auth::{login_router, require_bearer, SessionAuthority};
use gradebook::characters::{
    character_router, comment_router, CharacterRepository, CharacterService, CommentRepository,
    CommentService,
};
use gradebook::grading::{grading_router, GradeService, StudentRepository};
use gradebook::products::{product_admin_router, product_router, ProductRepository, ProductService};
use serde_json::json;
use std::sync::Arc;

/// Every domain service the HTTP surface exposes.
pub(crate) struct ApiServices<S, C, M, P> {
    pub(crate) grades: Arc<GradeService<S>>,
    pub(crate) characters: Arc<CharacterService<C>>,
    pub(crate) comments: Arc<CommentService<M, C>>,
    pub(crate) products: Arc<ProductService<P>>,
    pub(crate) authority: Arc<SessionAuthority>,
}

pub(crate) fn with_gradebook_routes<S, C, M, P>(services: ApiServices<S, C, M, P>) -> axum::Router
where
    S: StudentRepository + 'static,
    C: CharacterRepository + 'static,
    M: CommentRepository + 'static,
    P: ProductRepository + 'static,
{
    let ApiServices {
        grades,
        characters,
        comments,
        products,
        authority,
    } = services;

    let protected = grading_router(grades)
        .merge(character_router(characters))
        .merge(product_admin_router(products.clone()))
        .route_layer(middleware::from_fn_with_state(
            authority.clone(),
            require_bearer,
        ));

    protected
        .merge(login_router(authority))
        .merge(comment_router(comments))
        .merge(product_router(products))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
