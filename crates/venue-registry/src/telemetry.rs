use prometheus::{TextEncoder, Encoder, Registry, IntCounter, IntCounterVec, IntGauge, HistogramVec, HistogramOpts, opts};
use once_cell::sync::Lazy;
use axum::{response::IntoResponse, http::StatusCode};
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
pub static HTTP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(opts!("http_requests_total", "HTTP request count"), &["method", "path", "status", "outcome"]).unwrap();
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let h = HistogramVec::new(HistogramOpts::new("http_request_duration_seconds", "HTTP request latency seconds"), &["method", "path"]).unwrap();
    REGISTRY.register(Box::new(h.clone())).ok();
    h
});
pub static SHOWS_TOTAL: Lazy<IntGauge> = Lazy::new(|| {
    let g = IntGauge::new("shows_total", "Number of show records seen by the last listing").unwrap();
    REGISTRY.register(Box::new(g.clone())).ok();
    g
});
pub static ASSET_UPLOAD_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("asset_upload_bytes_total", "Total bytes written to the asset store").unwrap();
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});
pub static MASS_EMAIL_MESSAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(opts!("mass_email_messages_total", "Mass email messages handed to the provider"), &["outcome"]).unwrap();
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&metric_families, &mut buf).is_err() { return StatusCode::INTERNAL_SERVER_ERROR.into_response(); }
    ([("Content-Type","text/plain; version=0.0.4")], buf).into_response()
}

const STATIC_ROUTES: &[&str] = &[
    "/health", "/readyz", "/metrics", "/shows", "/api/upload-image", "/upload-image",
    "/api/send-mass-email", "/api/templates", "/api/recipient-lists", "/openapi.json", "/swagger",
];

/// Collapse path parameters so metric label cardinality stays bounded. Paths that match
/// no route share the `other` label.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let segs: Vec<&str> = trimmed.split('/').collect();
    match segs.as_slice() {
        ["", "shows", id] if !id.is_empty() => "/shows/:id".into(),
        ["", "api", "templates", name] if !name.is_empty() => "/api/templates/:name".into(),
        ["", "api", "recipient-lists", name] if !name.is_empty() => "/api/recipient-lists/:name".into(),
        ["", "uploads", _, ..] => "/uploads/*".into(),
        _ if STATIC_ROUTES.contains(&trimmed) => trimmed.to_string(),
        _ => "other".into(),
    }
}

/// Install the global subscriber. `json` switches to one JSON object per event.
pub fn init_logging(json: bool) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = fmt::layer().with_target(false);
    if json {
        tracing_subscriber::registry().with(env).with(base.json()).init();
    } else {
        tracing_subscriber::registry().with(env).with(base.compact()).init();
    }
}
