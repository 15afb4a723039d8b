use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use emb_db::{JobFilter, JobRow, NewJob};
use emb_status::{EntityKind, JobStatus};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    forms::{
        filter_code, optional_uuid, required_code, required_number, required_text, required_uuid,
        JobAddForm, JobEditForm, JobListQuery,
    },
    state::AppState,
};

// ---------------------------------------------------------------------------
// GET /jobs
// ---------------------------------------------------------------------------

/// List jobs. When both `order_id` and `client_id` are given they must
/// agree: asking for another client's order is forbidden.
pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<JobListQuery>,
) -> ApiResult<Json<Vec<JobRow>>> {
    let status = filter_code::<JobStatus>(EntityKind::Job, q.status.as_deref())?;
    let mut client_id = optional_uuid("client_id", q.client_id.as_deref())?;
    let order_id = optional_uuid("order_id", q.order_id.as_deref())?;

    if let Some(oid) = order_id {
        let order = emb_db::fetch_order(&st.pool, oid).await?;
        match client_id {
            Some(cid) if cid != order.client_id => {
                return Err(ApiError::Forbidden(
                    "order belongs to a different client".to_string(),
                ));
            }
            _ => client_id = Some(order.client_id),
        }
    }

    if let Some(cid) = client_id {
        emb_db::fetch_client(&st.pool, cid).await?;
    }

    let rows = emb_db::list_jobs(
        &st.pool,
        &JobFilter {
            client_id,
            order_id,
            status,
        },
    )
    .await?;
    Ok(Json(rows))
}

// ---------------------------------------------------------------------------
// POST /orders/:order_id/add-job
// ---------------------------------------------------------------------------

/// Create a job on an order. The asset must belong to the order's client.
pub(crate) async fn add(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Form(form): Form<JobAddForm>,
) -> ApiResult<Redirect> {
    let order_id = required_uuid("order_id", &order_id)?;
    let asset_id = required_uuid("asset_id", &form.asset_id)?;
    let job_type = required_text("type", &form.job_type)?;
    let amount: i32 = required_number("amount", &form.amount)?;
    let price: i64 = required_number("price", &form.price)?;
    let complexity: i64 = required_number("complexity", &form.complexity)?;
    if amount <= 0 {
        return Err(ApiError::bad_request("amount must be positive"));
    }
    if price < 0 {
        return Err(ApiError::bad_request("price must not be negative"));
    }

    let order = emb_db::fetch_order(&st.pool, order_id).await?;
    let asset = emb_db::fetch_asset(&st.pool, order.client_id, asset_id).await?;

    let job = NewJob {
        order_id: order.order_id,
        client_id: order.client_id,
        asset_id: asset.asset_id,
        r#type: job_type,
        amount,
        price,
        complexity,
    };
    let job_id = emb_db::insert_job(&st.pool, &job, st.job_insert_timeout).await?;

    info!(%job_id, %order_id, price, "job created");
    Ok(Redirect::to(&format!("/jobs/{job_id}")))
}

// ---------------------------------------------------------------------------
// GET /jobs/:job_id
// ---------------------------------------------------------------------------

pub(crate) async fn detail(
    State(st): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobRow>> {
    let job_id = required_uuid("job_id", &job_id)?;
    Ok(Json(emb_db::fetch_job(&st.pool, job_id).await?))
}

// ---------------------------------------------------------------------------
// POST /jobs/:job_id
// ---------------------------------------------------------------------------

/// Change a job's status and, optionally, its asset.
pub(crate) async fn edit(
    State(st): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Form(form): Form<JobEditForm>,
) -> ApiResult<Redirect> {
    let status = required_code::<JobStatus>(&form.status)?;
    let job_id = required_uuid("job_id", &job_id)?;
    let new_asset = optional_uuid("asset_id", Some(form.asset_id.as_str()))?;

    let job = emb_db::fetch_job(&st.pool, job_id).await?;
    let asset_id = match new_asset {
        Some(id) if id != job.asset_id => {
            emb_db::fetch_asset(&st.pool, job.client_id, id).await?.asset_id
        }
        _ => job.asset_id,
    };

    let updated = emb_db::update_job_status(&st.pool, job_id, status, asset_id).await?;
    Ok(Redirect::to(&format!("/jobs?order_id={}", updated.order_id)))
}
