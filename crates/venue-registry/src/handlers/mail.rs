use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::ApiResult,
    handlers::shows::MessageResponse,
    mailer::MassEmailReport,
    mailing::MassEmailRequest,
    models::{EmailTemplate, RecipientList, TemplateInput},
    AppState,
};

/// Send one message per recipient through the configured provider
#[utoipa::path(post, path = "/api/send-mass-email", request_body = MassEmailRequest,
    responses( (status=200, body=MassEmailReport), (status=400, body=crate::error::ApiErrorBody), (status=404, body=crate::error::ApiErrorBody), (status=502, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state, req), fields(recipients=req.emails.len(), list=?req.list_name))]
pub async fn send_mass_email(State(state): State<AppState>, Json(req): Json<MassEmailRequest>) -> ApiResult<Json<MassEmailReport>> {
    Ok(Json(state.mailing.send_mass_email(req).await?))
}

#[utoipa::path(get, path = "/api/templates", responses( (status=200, body=[EmailTemplate]) ))]
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<EmailTemplate>>> {
    Ok(Json(state.mailing.templates().await?))
}

/// Create or replace a template by name
#[utoipa::path(put, path = "/api/templates/{name}", params( ("name" = String, Path, description = "Template name") ), request_body = TemplateInput,
    responses( (status=200, body=EmailTemplate), (status=400, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state, input))]
pub async fn save_template(State(state): State<AppState>, Path(name): Path<String>, Json(input): Json<TemplateInput>) -> ApiResult<Json<EmailTemplate>> {
    Ok(Json(state.mailing.save_template(&name, input).await?))
}

#[utoipa::path(delete, path = "/api/templates/{name}", params( ("name" = String, Path, description = "Template name") ),
    responses( (status=200, body=MessageResponse), (status=404, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state))]
pub async fn delete_template(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<MessageResponse>> {
    state.mailing.delete_template(&name).await?;
    Ok(Json(MessageResponse { message: "Deleted".into() }))
}

#[derive(Deserialize, ToSchema)]
pub struct RecipientListInput { pub emails: Vec<String> }

#[utoipa::path(get, path = "/api/recipient-lists", responses( (status=200, body=[RecipientList]) ))]
pub async fn list_recipient_lists(State(state): State<AppState>) -> ApiResult<Json<Vec<RecipientList>>> {
    Ok(Json(state.mailing.lists().await?))
}

/// Create or replace a recipient list by name
#[utoipa::path(put, path = "/api/recipient-lists/{name}", params( ("name" = String, Path, description = "List name") ), request_body = RecipientListInput,
    responses( (status=200, body=RecipientList), (status=400, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state, input))]
pub async fn save_recipient_list(State(state): State<AppState>, Path(name): Path<String>, Json(input): Json<RecipientListInput>) -> ApiResult<Json<RecipientList>> {
    Ok(Json(state.mailing.save_list(&name, input.emails).await?))
}

#[utoipa::path(delete, path = "/api/recipient-lists/{name}", params( ("name" = String, Path, description = "List name") ),
    responses( (status=200, body=MessageResponse), (status=404, body=crate::error::ApiErrorBody) ))]
#[tracing::instrument(level="info", skip(state))]
pub async fn delete_recipient_list(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<MessageResponse>> {
    state.mailing.delete_list(&name).await?;
    Ok(Json(MessageResponse { message: "Deleted".into() }))
}
