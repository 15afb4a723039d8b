//! Consumable goods ledger (thread, towels, shirts...).
//!
//! `type` and `unit` are registry codes. [`GoodFields`] carries them as the
//! `&'static str` returned by `emb_status::validate`, so only registered
//! codes are ever bound.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use emb_status::GoodsStatus;

use crate::filter::Filters;
use crate::NotFound;

const GOOD_SELECT: &str = r#"
    select
      good_id,
      job_id,
      employee_id,
      owner_id,
      type,
      amount,
      unit,
      notes,
      recorded_at,
      status
    from goods"#;

#[derive(Debug, Clone, Serialize)]
pub struct GoodRow {
    pub good_id: Uuid,
    pub job_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub r#type: String,
    pub amount: i32,
    pub unit: String,
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
    pub status: GoodsStatus,
}

/// Fields written by both insert and update.
#[derive(Debug, Clone)]
pub struct GoodFields {
    pub job_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub r#type: &'static str,
    pub amount: i32,
    pub unit: &'static str,
    pub notes: String,
    pub status: GoodsStatus,
}

fn good_from_row(row: &PgRow) -> Result<GoodRow> {
    Ok(GoodRow {
        good_id: row.try_get("good_id")?,
        job_id: row.try_get("job_id")?,
        employee_id: row.try_get("employee_id")?,
        owner_id: row.try_get("owner_id")?,
        r#type: row.try_get("type")?,
        amount: row.try_get("amount")?,
        unit: row.try_get("unit")?,
        notes: row.try_get("notes")?,
        recorded_at: row.try_get("recorded_at")?,
        status: row.try_get::<String, _>("status")?.parse()?,
    })
}

pub async fn fetch_good(pool: &PgPool, good_id: Uuid) -> Result<GoodRow> {
    let row = sqlx::query(&format!("{GOOD_SELECT} where good_id = $1"))
        .bind(good_id)
        .fetch_optional(pool)
        .await
        .context("fetch_good failed")?
        .ok_or_else(|| NotFound::new("good", good_id))?;

    good_from_row(&row)
}

#[derive(Debug, Clone, Default)]
pub struct GoodsFilter {
    pub owner_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub status: Option<GoodsStatus>,
}

impl GoodsFilter {
    fn filters(&self) -> Filters {
        Filters::new()
            .eq_opt("owner_id", self.owner_id)
            .eq_opt("status", self.status.map(|s| s.as_db_str()))
            .eq_opt("job_id", self.job_id)
    }
}

pub async fn list_goods(pool: &PgPool, filter: &GoodsFilter) -> Result<Vec<GoodRow>> {
    let mut qb = filter.filters().select(GOOD_SELECT, "recorded_at desc");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_goods query failed")?;

    rows.iter().map(good_from_row).collect()
}

/// Record a goods movement, timestamped now.
pub async fn insert_good(pool: &PgPool, good: &GoodFields) -> Result<Uuid> {
    let good_id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into goods (
          good_id, job_id, employee_id, owner_id, type, amount, unit, notes, status, recorded_at
        ) values (
          $1, $2, $3, $4, $5, $6, $7, $8, $9, $10
        )
        "#,
    )
    .bind(good_id)
    .bind(good.job_id)
    .bind(good.employee_id)
    .bind(good.owner_id)
    .bind(good.r#type)
    .bind(good.amount)
    .bind(good.unit)
    .bind(&good.notes)
    .bind(good.status.as_db_str())
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert_good failed")?;

    Ok(good_id)
}

/// Rewrite type, amount, unit, notes and status. Links (job, employee,
/// owner) and the recorded time are left as stored.
pub async fn update_good(pool: &PgPool, good_id: Uuid, good: &GoodFields) -> Result<()> {
    let res = sqlx::query(
        r#"
        update goods
        set type = $1, amount = $2, unit = $3, notes = $4, status = $5
        where good_id = $6
        "#,
    )
    .bind(good.r#type)
    .bind(good.amount)
    .bind(good.unit)
    .bind(&good.notes)
    .bind(good.status.as_db_str())
    .bind(good_id)
    .execute(pool)
    .await
    .context("update_good failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("good", good_id).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goods_filter_renders_owner_status_job() {
        let f = GoodsFilter {
            owner_id: Some(Uuid::new_v4()),
            job_id: Some(Uuid::new_v4()),
            status: Some(GoodsStatus::InStock),
        };
        let qb = f.filters().select("select good_id from goods", "recorded_at desc");
        assert_eq!(
            qb.sql(),
            "select good_id from goods where owner_id = $1 and status = $2 and job_id = $3 order by recorded_at desc"
        );
    }

    #[test]
    fn empty_goods_filter_lists_everything() {
        let f = GoodsFilter::default();
        assert!(f.filters().is_empty());
    }
}
