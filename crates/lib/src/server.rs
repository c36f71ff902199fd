//! REST routes exposing a [`Backend`] over HTTP.
//!
//! The routes mirror the ones [`HttpBackend`](crate::backend::HttpBackend)
//! calls, so an `HttpBackend` pointed at this router behaves like the
//! backend it wraps. Used by the `serve` command for local development.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Json as ExtractJson, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::{Value, json};

use crate::{Error, Pagination, backend::Backend, user::User};

type SharedBackend = Arc<dyn Backend>;

/// Build the router for `backend`.
pub fn router(backend: SharedBackend) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{collection}", get(list_records).post(create_record))
        .route(
            "/{collection}/{id}",
            get(get_record).put(update_record).delete(remove_record),
        )
        .with_state(backend)
}

/// An [`Error`] rendered as a JSON error response.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            err if err.is_not_found() => StatusCode::NOT_FOUND,
            Error::Backend(err) if err.is_io_error() => StatusCode::BAD_REQUEST,
            Error::Serialize(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn list_records(
    State(backend): State<SharedBackend>,
    Path(collection): Path<String>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Value>> {
    let pagination = (pagination != Pagination::default()).then_some(pagination);
    let payload = backend.load(&collection, pagination.as_ref()).await?;
    Ok(Json(payload.into_json()?))
}

async fn create_record(
    State(backend): State<SharedBackend>,
    Path(collection): Path<String>,
    body: String,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let payload = backend.push(&collection, body).await?;
    Ok((StatusCode::CREATED, Json(payload.into_json()?)))
}

async fn get_record(
    State(backend): State<SharedBackend>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let payload = backend.get_by_id(&collection, &id).await?;
    Ok(Json(payload.into_json()?))
}

async fn update_record(
    State(backend): State<SharedBackend>,
    Path((collection, id)): Path<(String, String)>,
    ExtractJson(user): ExtractJson<User>,
) -> ApiResult<Json<Value>> {
    let payload = backend.set(&collection, &id, &user).await?;
    Ok(Json(payload.into_json()?))
}

async fn remove_record(
    State(backend): State<SharedBackend>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let payload = backend.remove(&collection, &id).await?;
    Ok(Json(payload.into_json()?))
}
