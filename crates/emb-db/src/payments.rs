use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use emb_status::PaymentProvider;

use crate::filter::Filters;
use crate::NotFound;

const PAYMENT_SELECT: &str = r#"
    select payment_id, client_id, order_id, price_total, provider, paid_at
    from payments"#;

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub client_id: Uuid,
    pub order_id: Uuid,
    pub price_total: i64,
    pub provider: PaymentProvider,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub client_id: Uuid,
    pub order_id: Uuid,
    pub price_total: i64,
    pub provider: PaymentProvider,
}

fn payment_from_row(row: &PgRow) -> Result<PaymentRow> {
    Ok(PaymentRow {
        payment_id: row.try_get("payment_id")?,
        client_id: row.try_get("client_id")?,
        order_id: row.try_get("order_id")?,
        price_total: row.try_get("price_total")?,
        provider: row.try_get::<String, _>("provider")?.parse()?,
        paid_at: row.try_get("paid_at")?,
    })
}

pub async fn fetch_payment(pool: &PgPool, payment_id: Uuid) -> Result<PaymentRow> {
    let row = sqlx::query(&format!("{PAYMENT_SELECT} where payment_id = $1"))
        .bind(payment_id)
        .fetch_optional(pool)
        .await
        .context("fetch_payment failed")?
        .ok_or_else(|| NotFound::new("payment", payment_id))?;

    payment_from_row(&row)
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub client_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub provider: Option<PaymentProvider>,
}

impl PaymentFilter {
    fn filters(&self) -> Filters {
        Filters::new()
            .eq_opt("client_id", self.client_id)
            .eq_opt("provider", self.provider.map(|p| p.as_db_str()))
            .eq_opt("order_id", self.order_id)
    }
}

/// Payments matching `filter`, latest first.
pub async fn list_payments(pool: &PgPool, filter: &PaymentFilter) -> Result<Vec<PaymentRow>> {
    let mut qb = filter.filters().select(PAYMENT_SELECT, "paid_at desc");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_payments query failed")?;

    rows.iter().map(payment_from_row).collect()
}

/// Record a payment against an order. The order's `price_total` is not
/// touched: payments and job prices are tracked independently.
pub async fn insert_payment(pool: &PgPool, payment: &NewPayment) -> Result<Uuid> {
    let payment_id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into payments (payment_id, client_id, order_id, price_total, provider, paid_at)
        values ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(payment_id)
    .bind(payment.client_id)
    .bind(payment.order_id)
    .bind(payment.price_total)
    .bind(payment.provider.as_db_str())
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert_payment failed")?;

    info!(
        %payment_id,
        order_id = %payment.order_id,
        amount = payment.price_total,
        provider = payment.provider.code(),
        "payment recorded"
    );
    Ok(payment_id)
}
