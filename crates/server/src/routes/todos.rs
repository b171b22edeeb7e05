use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use models::{Todo, TodoInput};
use serde_json::{Map, Value};
use tracing::warn;

use super::AppState;
use crate::errors::ApiError;

/// Set on list responses when undecodable records were left out.
pub const SKIPPED_RECORDS_HEADER: HeaderName = HeaderName::from_static("x-skipped-records");

/// Bodies are decoded whatever the `Content-Type` says; only bytes that are
/// not JSON of the record's shape are a 400.
fn parse_input(body: &[u8]) -> Result<TodoInput, ApiError> {
    TodoInput::from_json_bytes(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /todos
pub async fn list_todos(State(state): State<AppState>) -> Result<Response, ApiError> {
    let listing = state.todos.list().await?;
    let mut resp = Json(listing.todos).into_response();
    if listing.skipped > 0 {
        resp.headers_mut()
            .insert(SKIPPED_RECORDS_HEADER, HeaderValue::from(listing.skipped));
    }
    Ok(resp)
}

/// POST /todos
pub async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let input = parse_input(&body)?;
    let todo = state.todos.create(input).await?;
    Ok(Json(todo))
}

/// GET /todos/:id
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state.todos.get(&id).await?;
    Ok(Json(todo))
}

/// PUT /todos/:id
///
/// The body is checked before the lookup, so a bad body on a missing id is a 400.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let input = parse_input(&body)?;
    let todo = state.todos.update(&id, input).await?;
    Ok(Json(todo))
}

/// DELETE /todos/:id
///
/// Succeeds whether or not the id existed. Only a store failure yields 404.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if let Err(e) = state.todos.delete(&id).await {
        warn!(%id, error = %e, "delete failed");
        return Err(ApiError::NotFound);
    }
    let mut body = Map::new();
    body.insert(format!("id #{id}"), Value::from("deleted"));
    Ok(Json(Value::Object(body)))
}
