use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use emb_db::{JobFilter, OrderFilter, OrderRow};
use emb_status::{EntityKind, OrderStatus};
use tracing::info;

use crate::{
    api_types::OrderDetailResponse,
    error::{ApiError, ApiResult},
    forms::{filter_code, optional_uuid, required_code, required_uuid, OrderAddForm, OrderEditForm, OrderListQuery},
    state::AppState,
};

// ---------------------------------------------------------------------------
// GET /orders
// ---------------------------------------------------------------------------

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<OrderListQuery>,
) -> ApiResult<Json<Vec<OrderRow>>> {
    let status = filter_code::<OrderStatus>(EntityKind::Order, q.status.as_deref())?;
    let client_id = optional_uuid("client_id", q.client_id.as_deref())?;

    if let Some(id) = client_id {
        emb_db::fetch_client(&st.pool, id).await?;
    }

    let rows = emb_db::list_orders(&st.pool, &OrderFilter { client_id, status }).await?;
    Ok(Json(rows))
}

// ---------------------------------------------------------------------------
// POST /orders/add
// ---------------------------------------------------------------------------

/// Open an order on the client's first active address.
pub(crate) async fn add(
    State(st): State<Arc<AppState>>,
    Form(form): Form<OrderAddForm>,
) -> ApiResult<Redirect> {
    let client_id = required_uuid("client_id", &form.client_id)?;

    let client = emb_db::fetch_client(&st.pool, client_id).await?;
    let addresses = emb_db::list_addresses(&st.pool, Some(client.client_id), false).await?;
    let Some(address) = addresses.first() else {
        return Err(ApiError::PreconditionFailed(
            "client has no address; add one before creating an order".to_string(),
        ));
    };

    let order_id = emb_db::insert_order(&st.pool, client.client_id, address.address_id).await?;

    info!(%order_id, %client_id, "order opened");
    Ok(Redirect::to(&format!("/orders/{order_id}")))
}

// ---------------------------------------------------------------------------
// GET /orders/:order_id
// ---------------------------------------------------------------------------

pub(crate) async fn detail(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderDetailResponse>> {
    let order_id = required_uuid("order_id", &order_id)?;

    let order = emb_db::fetch_order(&st.pool, order_id).await?;
    let jobs = emb_db::list_jobs(
        &st.pool,
        &JobFilter {
            order_id: Some(order_id),
            ..JobFilter::default()
        },
    )
    .await?;

    Ok(Json(OrderDetailResponse { order, jobs }))
}

// ---------------------------------------------------------------------------
// POST /orders/:order_id
// ---------------------------------------------------------------------------

/// Change status and billing address. The address must belong to the
/// order's client.
pub(crate) async fn edit(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Form(form): Form<OrderEditForm>,
) -> ApiResult<Redirect> {
    let status = required_code::<OrderStatus>(&form.status)?;
    let order_id = required_uuid("order_id", &order_id)?;
    let address_id = required_uuid("client_address_id", &form.client_address_id)?;

    let order = emb_db::fetch_order(&st.pool, order_id).await?;
    emb_db::fetch_address(&st.pool, order.client_id, address_id).await?;
    emb_db::update_order(&st.pool, &order, status, address_id).await?;

    Ok(Redirect::to(&format!("/orders/{order_id}")))
}
