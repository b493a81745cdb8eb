use axum::{response::{IntoResponse, Response}, Json, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorBody { pub code: &'static str, pub message: String }

#[derive(Debug, Clone)]
pub struct ApiError { pub status: StatusCode, pub code: &'static str, pub message: String }

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }
    pub fn not_found(msg: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, "not_found", msg) }
    pub fn validation(msg: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "validation", msg) }
    pub fn internal(msg: impl Into<String>) -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg) }
    pub fn bad_request(msg: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "bad_request", msg) }
    pub fn bad_gateway(msg: impl Into<String>) -> Self { Self::new(StatusCode::BAD_GATEWAY, "provider", msg) }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}: {}", self.code, self.message) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody { code: self.code, message: self.message };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures raised by the registry and mailing services, independent of HTTP.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
    #[error("mail provider failure: {0}")]
    Provider(String),
}

impl RegistryError {
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
    pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }
}

impl From<sqlx::Error> for RegistryError {
    fn from(e: sqlx::Error) -> Self { Self::Storage(anyhow::Error::new(e)) }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Validation(msg) => { tracing::warn!(%msg, "request.validation_failed"); ApiError::validation(msg) }
            RegistryError::NotFound(msg) => ApiError::not_found(msg),
            RegistryError::Storage(err) => { tracing::error!(error=%format!("{err:#}"), "request.storage_failed"); ApiError::internal(format!("{err:#}")) }
            RegistryError::Provider(msg) => { tracing::error!(%msg, "request.provider_failed"); ApiError::bad_gateway(msg) }
        }
    }
}
