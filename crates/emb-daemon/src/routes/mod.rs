//! Axum router and all HTTP handlers for emb-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers validate every submitted code and id before
//! the first storage call, so a malformed request never reaches Postgres.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use emb_status::{valid_statuses, EntityKind};

use crate::{
    api_types::{HealthResponse, StatusTableResponse},
    error::{ApiError, ApiResult},
    state::AppState,
};

mod clients;
mod goods;
mod jobs;
mod orders;
mod payments;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/statuses/:kind", get(status_table))
        .route("/clients", get(clients::list))
        .route("/clients/add", post(clients::add))
        .route("/clients/:client_id", get(clients::detail).post(clients::edit))
        .route("/clients/:client_id/addresses", post(clients::add_address))
        .route("/clients/:client_id/assets", post(clients::add_asset))
        .route("/orders", get(orders::list))
        .route("/orders/add", post(orders::add))
        .route("/orders/:order_id", get(orders::detail).post(orders::edit))
        .route("/orders/:order_id/add-job", post(jobs::add))
        .route("/orders/:order_id/payments", post(payments::add))
        .route("/jobs", get(jobs::list))
        .route("/jobs/:job_id", get(jobs::detail).post(jobs::edit))
        .route("/goods", get(goods::list))
        .route("/goods/add", post(goods::add))
        .route("/goods/:good_id", get(goods::detail).post(goods::edit))
        .route("/payments", get(payments::list))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/statuses/:kind
// ---------------------------------------------------------------------------

pub(crate) async fn status_table(Path(kind): Path<String>) -> ApiResult<Json<StatusTableResponse>> {
    let kind = EntityKind::parse(&kind)
        .ok_or_else(|| ApiError::NotFound(format!("unknown status kind: {kind}")))?;

    Ok(Json(StatusTableResponse {
        kind: kind.as_str(),
        entries: valid_statuses(kind),
    }))
}
