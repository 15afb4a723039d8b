use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use emb_status::{plan_job_update, JobChange, JobStatus};

use crate::filter::Filters;
use crate::{db_timestamp, NotFound};

/// Deadline for the job insert + order total transaction.
pub const DEFAULT_JOB_INSERT_TIMEOUT: Duration = Duration::from_secs(1);

const JOB_SELECT: &str = r#"
    select
      job_id,
      order_id,
      client_id,
      asset_id,
      status,
      type,
      amount,
      price,
      complexity,
      start_time,
      end_time
    from jobs"#;

#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub job_id: Uuid,
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub asset_id: Uuid,
    pub status: JobStatus,
    #[serde(rename = "type")]
    pub r#type: String,
    pub amount: i32,
    pub price: i64,
    pub complexity: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

fn job_from_row(row: &PgRow) -> Result<JobRow> {
    Ok(JobRow {
        job_id: row.try_get("job_id")?,
        order_id: row.try_get("order_id")?,
        client_id: row.try_get("client_id")?,
        asset_id: row.try_get("asset_id")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        r#type: row.try_get("type")?,
        amount: row.try_get("amount")?,
        price: row.try_get("price")?,
        complexity: row.try_get("complexity")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
    })
}

pub async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow> {
    let row = sqlx::query(&format!("{JOB_SELECT} where job_id = $1"))
        .bind(job_id)
        .fetch_optional(pool)
        .await
        .context("fetch_job failed")?
        .ok_or_else(|| NotFound::new("job", job_id))?;

    job_from_row(&row)
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub client_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub status: Option<JobStatus>,
}

impl JobFilter {
    fn filters(&self) -> Filters {
        Filters::new()
            .eq_opt("client_id", self.client_id)
            .eq_opt("status", self.status.map(|s| s.as_db_str()))
            .eq_opt("order_id", self.order_id)
    }
}

/// Jobs matching `filter`, most recently started first; unstarted jobs last.
pub async fn list_jobs(pool: &PgPool, filter: &JobFilter) -> Result<Vec<JobRow>> {
    let mut qb = filter
        .filters()
        .select(JOB_SELECT, "start_time desc nulls last");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_jobs query failed")?;

    rows.iter().map(job_from_row).collect()
}

// ---------------------------------------------------------------------------
// Job creation
// ---------------------------------------------------------------------------

/// Fields of a job to create. There is no status: new jobs are always CREATED.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub asset_id: Uuid,
    pub r#type: String,
    pub amount: i32,
    pub price: i64,
    pub complexity: i64,
}

/// Insert a job and add its price to the owning order's `price_total`.
///
/// Both statements run in one transaction. `deadline` bounds acquiring the
/// connection and the two writes; COMMIT itself is never cancelled. When the
/// deadline expires or a write fails, the transaction is rolled back
/// explicitly before returning, so on `Err` neither the job row nor the total
/// change is visible to any other connection. A missing order is reported as
/// [`NotFound`].
///
/// The total is only ever incremented here. Cancelling a job or changing its
/// price elsewhere does not subtract from it, so `price_total` can drift
/// from the sum of live job prices.
pub async fn insert_job(pool: &PgPool, job: &NewJob, deadline: Duration) -> Result<Uuid> {
    let expires = Instant::now() + deadline;

    let mut tx = match timeout_at(expires, pool.begin()).await {
        Ok(tx) => tx.context("insert_job begin failed")?,
        Err(_) => return Err(deadline_expired(job, deadline)),
    };

    let job_id = Uuid::new_v4();
    let failure = match timeout_at(expires, write_job(&mut tx, job_id, job)).await {
        Ok(Ok(())) if Instant::now() < expires => None,
        Ok(Ok(())) | Err(_) => Some(deadline_expired(job, deadline)),
        Ok(Err(e)) => Some(e),
    };

    if let Some(err) = failure {
        if let Err(rb) = tx.rollback().await {
            warn!(order_id = %job.order_id, error = %rb, "insert_job rollback failed");
        }
        return Err(err);
    }

    tx.commit().await.context("insert_job commit failed")?;

    debug!(%job_id, order_id = %job.order_id, price = job.price, "job inserted");
    Ok(job_id)
}

fn deadline_expired(job: &NewJob, deadline: Duration) -> anyhow::Error {
    warn!(
        order_id = %job.order_id,
        deadline_us = deadline.as_micros() as u64,
        "insert_job deadline expired; transaction rolled back"
    );
    anyhow!("insert_job timed out after {}us", deadline.as_micros())
}

async fn write_job(tx: &mut Transaction<'_, Postgres>, job_id: Uuid, job: &NewJob) -> Result<()> {
    // Total first: a missing order is NotFound, not an FK violation.
    let res = sqlx::query(
        r#"
        update orders
        set price_total = price_total + $1
        where order_id = $2
        "#,
    )
    .bind(job.price)
    .bind(job.order_id)
    .execute(&mut **tx)
    .await
    .context("insert_job price_total update failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("order", job.order_id).into());
    }

    sqlx::query(
        r#"
        insert into jobs (
          job_id, order_id, client_id, asset_id, status, type, amount, price, complexity
        ) values (
          $1, $2, $3, $4, $5, $6, $7, $8, $9
        )
        "#,
    )
    .bind(job_id)
    .bind(job.order_id)
    .bind(job.client_id)
    .bind(job.asset_id)
    .bind(JobStatus::Created.as_db_str())
    .bind(&job.r#type)
    .bind(job.amount)
    .bind(job.price)
    .bind(job.complexity)
    .execute(&mut **tx)
    .await
    .context("insert_job insert failed")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Status transition
// ---------------------------------------------------------------------------

/// Change a job's status and asset, stamping start/end times as needed.
///
/// Fetches the stored row, plans the change against it, then issues one
/// UPDATE. The fetch and the update are separate statements with no
/// surrounding transaction: two concurrent edits of the same job can
/// interleave and the later write wins.
pub async fn update_job_status(
    pool: &PgPool,
    job_id: Uuid,
    new_status: JobStatus,
    new_asset_id: Uuid,
) -> Result<JobRow> {
    update_job_status_at(pool, job_id, new_status, new_asset_id, Utc::now()).await
}

/// [`update_job_status`] with an explicit clock reading.
pub async fn update_job_status_at(
    pool: &PgPool,
    job_id: Uuid,
    new_status: JobStatus,
    new_asset_id: Uuid,
    now: DateTime<Utc>,
) -> Result<JobRow> {
    let current = fetch_job(pool, job_id).await?;
    let now = db_timestamp(now);
    let change = plan_job_update(current.status, current.start_time, new_status, new_asset_id, now);

    let res = job_update_query(job_id, &change)
        .build()
        .execute(pool)
        .await
        .context("update_job_status failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("job", job_id).into());
    }

    if let Some(s) = change.status {
        info!(
            %job_id,
            from = current.status.as_db_str(),
            to = s.as_db_str(),
            started = change.start_time.is_some(),
            ended = change.end_time.is_some(),
            "job status changed"
        );
    }

    Ok(apply_change(current, &change))
}

/// Number of jobs currently on a machine (`IN_PROGRESS`).
pub async fn count_running_jobs(pool: &PgPool) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("select count(*) from jobs where status = $1")
        .bind(JobStatus::InProgress.as_db_str())
        .fetch_one(pool)
        .await
        .context("count_running_jobs failed")?;
    Ok(n)
}

fn apply_change(mut job: JobRow, change: &JobChange) -> JobRow {
    if let Some(s) = change.status {
        job.status = s;
    }
    if change.start_time.is_some() {
        job.start_time = change.start_time;
    }
    if change.end_time.is_some() {
        job.end_time = change.end_time;
    }
    job.asset_id = change.asset_id;
    job
}

fn job_update_query(job_id: Uuid, change: &JobChange) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("update jobs set ");

    if let Some(s) = change.status {
        qb.push("status = ").push_bind(s.as_db_str()).push(", ");
    }
    if let Some(t) = change.end_time {
        qb.push("end_time = ").push_bind(t).push(", ");
    }
    if let Some(t) = change.start_time {
        qb.push("start_time = ").push_bind(t).push(", ");
    }
    qb.push("asset_id = ").push_bind(change.asset_id);
    qb.push(" where job_id = ").push_bind(job_id);
    qb
}
