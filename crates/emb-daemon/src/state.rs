//! Shared runtime state for emb-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The pool is the only
//! shared resource; there is no cross-request lock.

use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            service: "emb-daemon",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub build: BuildInfo,
    /// Deadline for the job insert + order total transaction.
    pub job_insert_timeout: Duration,
}

impl AppState {
    pub fn new(pool: PgPool, job_insert_timeout: Duration) -> Self {
        Self {
            pool,
            build: BuildInfo::current(),
            job_insert_timeout,
        }
    }
}
