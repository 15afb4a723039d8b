use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use emb_db::{NewPayment, PaymentFilter, PaymentRow};
use emb_status::{EntityKind, PaymentProvider};

use crate::{
    error::{ApiError, ApiResult},
    forms::{filter_code, optional_uuid, required_code, required_number, required_uuid, PaymentForm, PaymentListQuery},
    state::AppState,
};

// ---------------------------------------------------------------------------
// GET /payments
// ---------------------------------------------------------------------------

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<PaymentListQuery>,
) -> ApiResult<Json<Vec<PaymentRow>>> {
    let filter = PaymentFilter {
        provider: filter_code::<PaymentProvider>(EntityKind::PaymentProvider, q.provider.as_deref())?,
        client_id: optional_uuid("client_id", q.client_id.as_deref())?,
        order_id: optional_uuid("order_id", q.order_id.as_deref())?,
    };

    Ok(Json(emb_db::list_payments(&st.pool, &filter).await?))
}

// ---------------------------------------------------------------------------
// POST /orders/:order_id/payments
// ---------------------------------------------------------------------------

pub(crate) async fn add(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Form(form): Form<PaymentForm>,
) -> ApiResult<Redirect> {
    let provider = required_code::<PaymentProvider>(&form.provider)?;
    let order_id = required_uuid("order_id", &order_id)?;
    let price_total: i64 = required_number("price_total", &form.price_total)?;
    if price_total <= 0 {
        return Err(ApiError::bad_request("price_total must be positive"));
    }

    let order = emb_db::fetch_order(&st.pool, order_id).await?;
    emb_db::insert_payment(
        &st.pool,
        &NewPayment {
            client_id: order.client_id,
            order_id: order.order_id,
            price_total,
            provider,
        },
    )
    .await?;

    Ok(Redirect::to(&format!("/payments?order_id={order_id}")))
}
