use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use emb_status::RecordStatus;

use crate::filter::Filters;
use crate::NotFound;

const CLIENT_SELECT: &str = "select client_id, first_name, last_name, email, status from clients";

#[derive(Debug, Clone, Serialize)]
pub struct ClientRow {
    pub client_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: RecordStatus,
}

#[derive(Debug, Clone)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: RecordStatus,
}

fn client_from_row(row: &PgRow) -> Result<ClientRow> {
    Ok(ClientRow {
        client_id: row.try_get("client_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        status: row.try_get::<String, _>("status")?.parse()?,
    })
}

pub async fn fetch_client(pool: &PgPool, client_id: Uuid) -> Result<ClientRow> {
    let row = sqlx::query(&format!("{CLIENT_SELECT} where client_id = $1"))
        .bind(client_id)
        .fetch_optional(pool)
        .await
        .context("fetch_client failed")?
        .ok_or_else(|| NotFound::new("client", client_id))?;

    client_from_row(&row)
}

/// All clients by name; archived ones only when `show_archived`.
pub async fn list_clients(pool: &PgPool, show_archived: bool) -> Result<Vec<ClientRow>> {
    let mut f = Filters::new();
    if !show_archived {
        f = f.not_eq("status", RecordStatus::Archived.as_db_str());
    }

    let mut qb = f.select(CLIENT_SELECT, "first_name, last_name desc");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_clients query failed")?;

    rows.iter().map(client_from_row).collect()
}

pub async fn insert_client(pool: &PgPool, client: &NewClient) -> Result<Uuid> {
    let client_id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into clients (client_id, first_name, last_name, email, status)
        values ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(client_id)
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.email)
    .bind(client.status.as_db_str())
    .execute(pool)
    .await
    .context("insert_client failed")?;

    Ok(client_id)
}

pub async fn update_client(pool: &PgPool, client_id: Uuid, client: &NewClient) -> Result<()> {
    let res = sqlx::query(
        r#"
        update clients
        set first_name = $1, last_name = $2, email = $3, status = $4
        where client_id = $5
        "#,
    )
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.email)
    .bind(client.status.as_db_str())
    .bind(client_id)
    .execute(pool)
    .await
    .context("update_client failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("client", client_id).into());
    }
    Ok(())
}
