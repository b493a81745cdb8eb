use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: &'static str }

/// Liveness check
#[utoipa::path(get, path = "/health", responses( (status = 200, body = HealthResponse) ))]
pub async fn health() -> Json<HealthResponse> { Json(HealthResponse { status: "ok" }) }

/// Readiness probe: the show store must answer a trivial query
#[utoipa::path(get, path = "/readyz", responses(
	(status = 200, body = HealthResponse, description = "Service ready"),
	(status = 503, body = HealthResponse, description = "Store not reachable")
))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
	match state.registry.ping().await {
		Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ready" })),
		Err(e) => {
			tracing::warn!(error=%e, "readiness.store_unreachable");
			(StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse { status: "degraded" }))
		}
	}
}
