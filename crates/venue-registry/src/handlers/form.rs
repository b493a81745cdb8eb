use axum::extract::{multipart::MultipartError, Multipart};
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{error::ApiError, models::ShowFields, storage::Upload};

/// Name of the multipart part carrying an image file.
pub const IMAGE_FIELD: &str = "image";

/// Documented shape of the show form. Parsing goes through [`read_multipart`].
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowForm {
    pub title: Option<String>,
    #[schema(example = "2025-03-01")]
    pub date: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub ticket_link: Option<String>,
    pub location: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

/// Documented shape of a standalone image upload.
#[derive(Deserialize, ToSchema)]
pub struct ImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm { pub fields: ShowFields, pub image: Option<Upload> }

/// Collect show text fields and the optional `image` file. Other parts are skipped.
/// An empty file input (no file name, no bytes) counts as no image.
pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else { continue };
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if file_name.is_empty() && bytes.is_empty() { continue; }
            form.image = Some(Upload { file_name, bytes });
        } else if field.file_name().is_some() {
            debug!(field=%name, "form.file_part_ignored");
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !form.fields.set(&name, value) { debug!(field=%name, "form.field_ignored"); }
        }
    }
    Ok(form)
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::new(e.status(), "bad_request", e.body_text())
}
