use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use emb_status::{plan_order_update, OrderChange, OrderStatus};

use crate::filter::Filters;
use crate::{db_timestamp, NotFound};

const ORDER_SELECT: &str = r#"
    select
      order_id,
      client_id,
      client_address_id,
      open_time,
      close_time,
      status,
      price_total
    from orders"#;

#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub client_address_id: Uuid,
    pub open_time: DateTime<Utc>,
    pub close_time: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    /// Running sum of job prices, incremented by `insert_job`.
    pub price_total: i64,
}

fn order_from_row(row: &PgRow) -> Result<OrderRow> {
    Ok(OrderRow {
        order_id: row.try_get("order_id")?,
        client_id: row.try_get("client_id")?,
        client_address_id: row.try_get("client_address_id")?,
        open_time: row.try_get("open_time")?,
        close_time: row.try_get("close_time")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        price_total: row.try_get("price_total")?,
    })
}

pub async fn fetch_order(pool: &PgPool, order_id: Uuid) -> Result<OrderRow> {
    let row = sqlx::query(&format!("{ORDER_SELECT} where order_id = $1"))
        .bind(order_id)
        .fetch_optional(pool)
        .await
        .context("fetch_order failed")?
        .ok_or_else(|| NotFound::new("order", order_id))?;

    order_from_row(&row)
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    fn filters(&self) -> Filters {
        Filters::new()
            .eq_opt("status", self.status.map(|s| s.as_db_str()))
            .eq_opt("client_id", self.client_id)
    }
}

/// Orders matching `filter`, newest first.
pub async fn list_orders(pool: &PgPool, filter: &OrderFilter) -> Result<Vec<OrderRow>> {
    let mut qb = filter.filters().select(ORDER_SELECT, "open_time desc");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_orders query failed")?;

    rows.iter().map(order_from_row).collect()
}

/// Open a new order for a client. Status starts `open`, total 0, no close time.
pub async fn insert_order(pool: &PgPool, client_id: Uuid, client_address_id: Uuid) -> Result<Uuid> {
    let order_id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into orders (
          order_id, client_id, client_address_id, open_time, close_time, status, price_total
        ) values (
          $1, $2, $3, $4, null, $5, 0
        )
        "#,
    )
    .bind(order_id)
    .bind(client_id)
    .bind(client_address_id)
    .bind(Utc::now())
    .bind(OrderStatus::Open.as_db_str())
    .execute(pool)
    .await
    .context("insert_order failed")?;

    Ok(order_id)
}

/// Apply a status and billing-address change to `order`.
///
/// The status column is written only when it differs from `order.status`;
/// entering `done` also stamps `close_time`. The address is always
/// overwritten. One row, one statement, no transaction.
pub async fn update_order(
    pool: &PgPool,
    order: &OrderRow,
    new_status: OrderStatus,
    new_address_id: Uuid,
) -> Result<OrderRow> {
    update_order_at(pool, order, new_status, new_address_id, Utc::now()).await
}

/// [`update_order`] with an explicit clock reading.
pub async fn update_order_at(
    pool: &PgPool,
    order: &OrderRow,
    new_status: OrderStatus,
    new_address_id: Uuid,
    now: DateTime<Utc>,
) -> Result<OrderRow> {
    let now = db_timestamp(now);
    let change = plan_order_update(order.status, new_status, new_address_id, now);

    let res = order_update_query(order.order_id, &change)
        .build()
        .execute(pool)
        .await
        .context("update_order failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("order", order.order_id).into());
    }

    if let Some(s) = change.status {
        info!(
            order_id = %order.order_id,
            from = order.status.code(),
            to = s.code(),
            closed = change.close_time.is_some(),
            "order status changed"
        );
    }

    let mut updated = order.clone();
    if let Some(s) = change.status {
        updated.status = s;
    }
    if change.close_time.is_some() {
        updated.close_time = change.close_time;
    }
    updated.client_address_id = change.client_address_id;
    Ok(updated)
}

fn order_update_query(order_id: Uuid, change: &OrderChange) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("update orders set ");

    if let Some(s) = change.status {
        qb.push("status = ").push_bind(s.as_db_str()).push(", ");
    }
    if let Some(t) = change.close_time {
        qb.push("close_time = ").push_bind(t).push(", ");
    }
    qb.push("client_address_id = ")
        .push_bind(change.client_address_id);
    qb.push(" where order_id = ").push_bind(order_id);
    qb
}
