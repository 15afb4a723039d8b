use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use emb_status::RecordStatus;

use crate::filter::Filters;
use crate::NotFound;

const ASSET_SELECT: &str = r#"
    select asset_id, client_id, filepath, original_filepath, status, received_at
    from assets"#;

/// A client-supplied design file or garment the shop works on.
#[derive(Debug, Clone, Serialize)]
pub struct AssetRow {
    pub asset_id: Uuid,
    pub client_id: Uuid,
    pub filepath: String,
    pub original_filepath: String,
    pub status: RecordStatus,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub filepath: String,
    pub original_filepath: String,
    pub status: RecordStatus,
}

fn asset_from_row(row: &PgRow) -> Result<AssetRow> {
    Ok(AssetRow {
        asset_id: row.try_get("asset_id")?,
        client_id: row.try_get("client_id")?,
        filepath: row.try_get("filepath")?,
        original_filepath: row.try_get("original_filepath")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        received_at: row.try_get("received_at")?,
    })
}

/// Fetch an asset owned by `client_id`; other clients' assets are not found.
pub async fn fetch_asset(pool: &PgPool, client_id: Uuid, asset_id: Uuid) -> Result<AssetRow> {
    let row = sqlx::query(&format!("{ASSET_SELECT} where client_id = $1 and asset_id = $2"))
        .bind(client_id)
        .bind(asset_id)
        .fetch_optional(pool)
        .await
        .context("fetch_asset failed")?
        .ok_or_else(|| NotFound::new("asset", asset_id))?;

    asset_from_row(&row)
}

pub async fn list_assets(
    pool: &PgPool,
    client_id: Option<Uuid>,
    show_archived: bool,
) -> Result<Vec<AssetRow>> {
    let mut f = Filters::new();
    if !show_archived {
        f = f.not_eq("status", RecordStatus::Archived.as_db_str());
    }
    let f = f.eq_opt("client_id", client_id);

    let mut qb = f.select(ASSET_SELECT, "received_at desc");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_assets query failed")?;

    rows.iter().map(asset_from_row).collect()
}

pub async fn insert_asset(pool: &PgPool, client_id: Uuid, asset: &NewAsset) -> Result<Uuid> {
    let asset_id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into assets (asset_id, client_id, filepath, original_filepath, status, received_at)
        values ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(asset_id)
    .bind(client_id)
    .bind(&asset.filepath)
    .bind(&asset.original_filepath)
    .bind(asset.status.as_db_str())
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert_asset failed")?;

    Ok(asset_id)
}

/// Only the stored path and the status are editable.
pub async fn update_asset(
    pool: &PgPool,
    asset_id: Uuid,
    filepath: &str,
    status: RecordStatus,
) -> Result<()> {
    let res = sqlx::query("update assets set filepath = $1, status = $2 where asset_id = $3")
        .bind(filepath)
        .bind(status.as_db_str())
        .bind(asset_id)
        .execute(pool)
        .await
        .context("update_asset failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("asset", asset_id).into());
    }
    Ok(())
}
