pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod mailing;
pub mod models;
pub mod registry;
pub mod services;
pub mod storage;
pub mod telemetry;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, response::Html, routing::{get, post, put}};
use sqlx::{Pool, Postgres};
use tower_http::services::ServeDir;
use utoipa::OpenApi;

use config::Config;
use handlers::{health::{health, readiness}, mail, shows::{create_show, delete_show, list_shows, update_show}, uploads::upload_image};
use mailer::{HttpMailProvider, LogMailProvider, MailProvider};
use mailing::Mailing;
use registry::ShowRegistry;
use services::{mailing::PgMailingRepository, shows::PgShowRepository};
use storage::{LocalAssetStore, PUBLIC_PREFIX};
use telemetry::metrics_handler;

/// Multipart framing allowed on top of the largest accepted file.
pub const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub registry: ShowRegistry,
    pub mailing: Mailing,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire the Postgres repositories, the local asset directory and the configured mail provider.
    pub fn from_config(cfg: &Config, pool: Pool<Postgres>) -> anyhow::Result<Self> {
        let assets = Arc::new(LocalAssetStore::open(&cfg.upload_dir)?);
        let registry = ShowRegistry::new(Arc::new(PgShowRepository::new(pool.clone())), assets);
        let provider: Arc<dyn MailProvider> = match &cfg.mail_api_url {
            Some(url) => {
                tracing::info!(endpoint=%url, "mail_provider.init_http");
                Arc::new(HttpMailProvider::new(url.clone(), cfg.mail_api_key.clone(), cfg.mail_from.clone())?)
            }
            None => {
                tracing::warn!("MAIL_API_URL not set, mass email will only be logged");
                Arc::new(LogMailProvider)
            }
        };
        let mailing = Mailing::new(Arc::new(PgMailingRepository::new(pool)), provider, cfg.mail_concurrency);
        Ok(Self { registry, mailing, max_upload_bytes: cfg.max_upload_bytes })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::health::readiness,
        handlers::shows::list_shows,
        handlers::shows::create_show,
        handlers::shows::update_show,
        handlers::shows::delete_show,
        handlers::uploads::upload_image,
        handlers::mail::send_mass_email,
        handlers::mail::list_templates,
        handlers::mail::save_template,
        handlers::mail::delete_template,
        handlers::mail::list_recipient_lists,
        handlers::mail::save_recipient_list,
        handlers::mail::delete_recipient_list,
    ),
    components(schemas(
        error::ApiErrorBody,
        models::Show,
        models::EmailTemplate,
        models::TemplateInput,
        models::RecipientList,
        handlers::health::HealthResponse,
        handlers::shows::MessageResponse,
        handlers::uploads::UploadResponse,
        handlers::form::ShowForm,
        handlers::form::ImageForm,
        handlers::mail::RecipientListInput,
        mailing::MassEmailRequest,
        mailer::MassEmailReport,
    )),
    tags( (name = "venue", description = "Venue show registry API") )
)]
pub struct ApiDoc;

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"/><title>Venue Registry API</title>
<link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>
window.onload = () => { SwaggerUIBundle({ url: '/openapi.json', dom_id: '#swagger-ui' }); };
</script>
</body></html>"#)
}

pub fn build_router(state: AppState) -> Router {
    let openapi = ApiDoc::openapi();
    let body_limit = state.max_upload_bytes + BODY_OVERHEAD_BYTES;
    let serve_dir = state.registry.assets().serve_dir().map(|d| d.to_path_buf());
    let router = Router::new()
        .route("/health", get(health))
        .route("/readyz", get(readiness))
        .route("/metrics", get(metrics_handler))
        .route("/shows", get(list_shows).post(create_show))
        .route("/shows/:id", put(update_show).delete(delete_show))
        .route("/api/upload-image", post(upload_image))
        // older admin page posts here
        .route("/upload-image", post(upload_image))
        .route("/api/send-mass-email", post(mail::send_mass_email))
        .route("/api/templates", get(mail::list_templates))
        .route("/api/templates/:name", put(mail::save_template).delete(mail::delete_template))
        .route("/api/recipient-lists", get(mail::list_recipient_lists))
        .route("/api/recipient-lists/:name", put(mail::save_recipient_list).delete(mail::delete_recipient_list))
        .route("/openapi.json", get(|| async move { axum::Json(openapi.clone()) }))
        .route("/swagger", get(swagger_ui))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);
    match serve_dir {
        Some(dir) => router.nest_service(PUBLIC_PREFIX, ServeDir::new(dir)),
        None => router,
    }
}
