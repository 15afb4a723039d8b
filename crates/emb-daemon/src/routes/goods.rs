use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use emb_db::{GoodFields, GoodRow, GoodsFilter};
use emb_status::{validate, EntityKind, GoodsStatus};

use crate::{
    error::ApiResult,
    forms::{filter_code, optional_uuid, required_code, required_number, required_uuid, GoodForm, GoodsListQuery},
    state::AppState,
};

/// Type and unit go through the registry; the returned codes are static.
fn good_fields(form: &GoodForm) -> ApiResult<GoodFields> {
    Ok(GoodFields {
        job_id: optional_uuid("job_id", Some(form.job_id.as_str()))?,
        employee_id: optional_uuid("employee_id", Some(form.employee_id.as_str()))?,
        owner_id: optional_uuid("owner_id", Some(form.owner_id.as_str()))?,
        r#type: validate(EntityKind::GoodsType, form.good_type.trim())?,
        amount: required_number("amount", &form.amount)?,
        unit: validate(EntityKind::GoodsUnit, form.unit.trim())?,
        notes: form.notes.trim().to_string(),
        status: required_code::<GoodsStatus>(&form.status)?,
    })
}

fn goods_location(job_id: Option<uuid::Uuid>) -> String {
    match job_id {
        Some(id) => format!("/goods?job_id={id}"),
        None => "/goods".to_string(),
    }
}

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<GoodsListQuery>,
) -> ApiResult<Json<Vec<GoodRow>>> {
    let filter = GoodsFilter {
        status: filter_code::<GoodsStatus>(EntityKind::Goods, q.status.as_deref())?,
        owner_id: optional_uuid("owner_id", q.owner_id.as_deref())?,
        job_id: optional_uuid("job_id", q.job_id.as_deref())?,
    };

    Ok(Json(emb_db::list_goods(&st.pool, &filter).await?))
}

pub(crate) async fn detail(
    State(st): State<Arc<AppState>>,
    Path(good_id): Path<String>,
) -> ApiResult<Json<GoodRow>> {
    let good_id = required_uuid("good_id", &good_id)?;
    Ok(Json(emb_db::fetch_good(&st.pool, good_id).await?))
}

pub(crate) async fn add(
    State(st): State<Arc<AppState>>,
    Form(form): Form<GoodForm>,
) -> ApiResult<Redirect> {
    let good = good_fields(&form)?;

    if let Some(job_id) = good.job_id {
        emb_db::fetch_job(&st.pool, job_id).await?;
    }
    let good_id = emb_db::insert_good(&st.pool, &good).await?;
    Ok(Redirect::to(&format!("/goods/{good_id}")))
}

/// Links (job, employee, owner) are fixed at insert; only the ledger
/// fields change here.
pub(crate) async fn edit(
    State(st): State<Arc<AppState>>,
    Path(good_id): Path<String>,
    Form(form): Form<GoodForm>,
) -> ApiResult<Redirect> {
    let good_id = required_uuid("good_id", &good_id)?;
    let fields = good_fields(&form)?;

    let stored = emb_db::fetch_good(&st.pool, good_id).await?;
    emb_db::update_good(&st.pool, good_id, &fields).await?;
    Ok(Redirect::to(&goods_location(stored.job_id)))
}
