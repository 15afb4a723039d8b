use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub mod addresses;
pub mod assets;
pub mod clients;
pub mod filter;
pub mod goods;
pub mod jobs;
pub mod orders;
pub mod payments;

pub use addresses::{fetch_address, insert_address, list_addresses, update_address, AddressRow, NewAddress};
pub use assets::{fetch_asset, insert_asset, list_assets, update_asset, AssetRow, NewAsset};
pub use clients::{fetch_client, insert_client, list_clients, update_client, ClientRow, NewClient};
pub use filter::{FilterValue, Filters, Op, Predicate};
pub use goods::{fetch_good, insert_good, list_goods, update_good, GoodFields, GoodRow, GoodsFilter};
pub use jobs::{
    count_running_jobs, fetch_job, insert_job, list_jobs, update_job_status, update_job_status_at, JobFilter, JobRow,
    NewJob, DEFAULT_JOB_INSERT_TIMEOUT,
};
pub use orders::{
    fetch_order, insert_order, list_orders, update_order, update_order_at, OrderFilter, OrderRow,
};
pub use payments::{fetch_payment, insert_payment, list_payments, NewPayment, PaymentFilter, PaymentRow};

pub const ENV_DB_URL: &str = "EMB_DATABASE_URL";

/// Connect to Postgres at `url` with a bounded pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Connect to Postgres using EMB_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url, 10).await
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='orders'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok,
        has_orders_table: exists,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_orders_table: bool,
}

/// `t` at the precision a `timestamptz` column keeps (microseconds), so rows
/// built in memory after a write equal the rows read back.
pub(crate) fn db_timestamp(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(6)
}

// ---------------------------------------------------------------------------
// NotFound
// ---------------------------------------------------------------------------

/// A requested row does not exist.
///
/// Travels inside `anyhow::Error`; callers that need to answer differently
/// (HTTP 404) use [`is_not_found`] or `downcast_ref::<NotFound>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub entity: &'static str,
    pub id: String,
}

impl NotFound {
    pub fn new(entity: &'static str, id: impl fmt::Display) -> Self {
        Self {
            entity,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found: {}", self.entity, self.id)
    }
}

impl std::error::Error for NotFound {}

pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<NotFound>().is_some()
}
