use axum::{extract::{Multipart, State}, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::{ApiError, ApiResult}, handlers::form::{read_multipart, ImageForm}, AppState};

#[derive(Serialize, ToSchema)]
pub struct UploadResponse { pub url: String }

/// Store a standalone image (email fliers) and return its public reference
#[utoipa::path(post, path = "/api/upload-image", request_body(content = ImageForm, content_type = "multipart/form-data", description = "`image` file part"),
    responses( (status=200, body=UploadResponse), (status=400, body=crate::error::ApiErrorBody), (status=500, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state, multipart))]
pub async fn upload_image(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let form = read_multipart(multipart).await?;
    let Some(upload) = form.image else { return Err(ApiError::bad_request("No file uploaded")); };
    let url = state.registry.store_image(upload).await?;
    Ok(Json(UploadResponse { url }))
}
