use axum::{extract::{Multipart, Path, State}, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    handlers::form::{read_multipart, ShowForm},
    models::Show,
    AppState,
};

#[derive(Serialize, ToSchema)]
pub struct MessageResponse { pub message: String }

/// Any path segment that is not a UUID cannot name a show.
fn parse_show_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("Show {raw} not found")))
}

/// List all shows, earliest date first
#[utoipa::path(get, path = "/shows", responses( (status=200, body=[Show]), (status=500, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="debug", skip(state))]
pub async fn list_shows(State(state): State<AppState>) -> ApiResult<Json<Vec<Show>>> {
    Ok(Json(state.registry.list().await?))
}

/// Create a show from a multipart form (title, date, time, description, ticketLink, location, image)
#[utoipa::path(post, path = "/shows", request_body(content = ShowForm, content_type = "multipart/form-data", description = "Show fields plus optional `image` file"),
    responses( (status=201, body=Show), (status=400, body=crate::error::ApiErrorBody), (status=500, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state, multipart))]
pub async fn create_show(State(state): State<AppState>, multipart: Multipart) -> ApiResult<(StatusCode, Json<Show>)> {
    let form = read_multipart(multipart).await?;
    let show = state.registry.create(form.fields, form.image).await?;
    Ok((StatusCode::CREATED, Json(show)))
}

/// Update any subset of a show's fields; an `image` file replaces the stored image
#[utoipa::path(put, path = "/shows/{id}", params( ("id" = String, Path, description = "Show id") ),
    request_body(content = ShowForm, content_type = "multipart/form-data", description = "Fields to overwrite plus optional `image` file"),
    responses( (status=200, body=Show), (status=400, body=crate::error::ApiErrorBody), (status=404, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state, multipart))]
pub async fn update_show(State(state): State<AppState>, Path(id): Path<String>, multipart: Multipart) -> ApiResult<Json<Show>> {
    let id = parse_show_id(&id)?;
    let form = read_multipart(multipart).await?;
    Ok(Json(state.registry.update(id, form.fields, form.image).await?))
}

/// Delete a show; its image file is kept
#[utoipa::path(delete, path = "/shows/{id}", params( ("id" = String, Path, description = "Show id") ),
    responses( (status=200, body=MessageResponse), (status=404, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state))]
pub async fn delete_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<MessageResponse>> {
    let id = parse_show_id(&id)?;
    state.registry.delete(id).await?;
    Ok(Json(MessageResponse { message: "Deleted".into() }))
}
