//! Binary entrypoint for the venue registry service.
use venue_registry::{build_router, config::Config, db::init_db, telemetry, AppState, BODY_OVERHEAD_BYTES};
use venue_registry::telemetry::{HTTP_REQUESTS, HTTP_REQUEST_DURATION, normalize_path};
use axum::{http::{Request, HeaderValue}, middleware::{self, Next}, response::Response, body::Body};
use tower_http::{limit::RequestBodyLimitLayer, cors::CorsLayer};
use tracing::info;
use std::{net::SocketAddr, time::{Duration, Instant}};
use uuid::Uuid;

async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path_label = normalize_path(req.uri().path());
    let start = Instant::now();
    let mut resp = next.run(req).await;
    let status = resp.status();
    let outcome = if status.as_u16() < 400 { "success" } else { "error" };
    HTTP_REQUESTS.with_label_values(&[method.as_str(), path_label.as_str(), status.as_str(), outcome]).inc();
    HTTP_REQUEST_DURATION.with_label_values(&[method.as_str(), path_label.as_str()]).observe(start.elapsed().as_secs_f64());
    if let Ok(v) = HeaderValue::from_str(&Uuid::new_v4().to_string()) { resp.headers_mut().insert("x-request-id", v); }
    resp
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_logging(Config::log_json_from_env());
    let cfg = Config::from_env();
    let pool = init_db(&cfg.database_url).await?;
    let state = AppState::from_config(&cfg, pool)?;
    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(cfg.max_upload_bytes + BODY_OVERHEAD_BYTES))
        .layer(middleware::from_fn(track_metrics));
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!(%addr, upload_dir=%cfg.upload_dir.display(), "venue-registry listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!(target: "shutdown.signal", "received Ctrl+C"),
            Err(e) => { tracing::error!(?e, "ctrl_c handler failed"); std::future::pending::<()>().await }
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => { s.recv().await; info!(target: "shutdown.signal", "received SIGTERM"); }
            Err(e) => { tracing::error!(?e, "SIGTERM handler failed"); std::future::pending::<()>().await }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tokio::time::sleep(Duration::from_millis(200)).await; // drain window
}
