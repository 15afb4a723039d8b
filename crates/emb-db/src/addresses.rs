use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use emb_status::RecordStatus;

use crate::filter::Filters;
use crate::NotFound;

const ADDRESS_SELECT: &str = r#"
    select
      address_id,
      client_id,
      name,
      address_line1,
      address_line2,
      city,
      state,
      country,
      zip_code,
      phone,
      status
    from addresses"#;

#[derive(Debug, Clone, Serialize)]
pub struct AddressRow {
    pub address_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub phone: String,
    pub status: RecordStatus,
}

/// Editable address fields. The owning client is fixed at insert.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub phone: String,
    pub status: RecordStatus,
}

fn address_from_row(row: &PgRow) -> Result<AddressRow> {
    Ok(AddressRow {
        address_id: row.try_get("address_id")?,
        client_id: row.try_get("client_id")?,
        name: row.try_get("name")?,
        address_line1: row.try_get("address_line1")?,
        address_line2: row.try_get("address_line2")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        country: row.try_get("country")?,
        zip_code: row.try_get("zip_code")?,
        phone: row.try_get("phone")?,
        status: row.try_get::<String, _>("status")?.parse()?,
    })
}

/// Fetch an address that belongs to `client_id`. An address owned by
/// another client is reported as not found.
pub async fn fetch_address(pool: &PgPool, client_id: Uuid, address_id: Uuid) -> Result<AddressRow> {
    let row = sqlx::query(&format!(
        "{ADDRESS_SELECT} where client_id = $1 and address_id = $2"
    ))
    .bind(client_id)
    .bind(address_id)
    .fetch_optional(pool)
    .await
    .context("fetch_address failed")?
    .ok_or_else(|| NotFound::new("address", address_id))?;

    address_from_row(&row)
}

pub async fn list_addresses(
    pool: &PgPool,
    client_id: Option<Uuid>,
    show_archived: bool,
) -> Result<Vec<AddressRow>> {
    let mut f = Filters::new();
    if !show_archived {
        f = f.not_eq("status", RecordStatus::Archived.as_db_str());
    }
    let f = f.eq_opt("client_id", client_id);

    let mut qb = f.select(ADDRESS_SELECT, "name desc");
    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("list_addresses query failed")?;

    rows.iter().map(address_from_row).collect()
}

pub async fn insert_address(pool: &PgPool, client_id: Uuid, address: &NewAddress) -> Result<Uuid> {
    let address_id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into addresses (
          address_id, client_id, name, address_line1, address_line2,
          city, state, country, zip_code, phone, status
        ) values (
          $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11
        )
        "#,
    )
    .bind(address_id)
    .bind(client_id)
    .bind(&address.name)
    .bind(&address.address_line1)
    .bind(&address.address_line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.country)
    .bind(&address.zip_code)
    .bind(&address.phone)
    .bind(address.status.as_db_str())
    .execute(pool)
    .await
    .context("insert_address failed")?;

    Ok(address_id)
}

pub async fn update_address(pool: &PgPool, address_id: Uuid, address: &NewAddress) -> Result<()> {
    let res = sqlx::query(
        r#"
        update addresses
        set name = $1, address_line1 = $2, address_line2 = $3, city = $4,
            state = $5, country = $6, zip_code = $7, phone = $8, status = $9
        where address_id = $10
        "#,
    )
    .bind(&address.name)
    .bind(&address.address_line1)
    .bind(&address.address_line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.country)
    .bind(&address.zip_code)
    .bind(&address.phone)
    .bind(address.status.as_db_str())
    .bind(address_id)
    .execute(pool)
    .await
    .context("update_address failed")?;

    if res.rows_affected() == 0 {
        return Err(NotFound::new("address", address_id).into());
    }
    Ok(())
}
