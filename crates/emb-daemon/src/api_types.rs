//! Response types for emb-daemon JSON endpoints.
//!
//! No business logic lives here.

use emb_db::{AddressRow, AssetRow, ClientRow, JobRow, OrderRow};
use emb_status::StatusEntry;
use serde::Serialize;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

// ---------------------------------------------------------------------------
// /v1/statuses/:kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusTableResponse {
    pub kind: &'static str,
    pub entries: &'static [StatusEntry],
}

// ---------------------------------------------------------------------------
// Detail views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetailResponse {
    pub client: ClientRow,
    pub addresses: Vec<AddressRow>,
    pub assets: Vec<AssetRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailResponse {
    pub order: OrderRow,
    pub jobs: Vec<JobRow>,
}
