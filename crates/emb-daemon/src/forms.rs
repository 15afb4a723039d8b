//! Form-post bodies, query strings, and the field parsers handlers share.
//!
//! Every field is decoded as text with `#[serde(default)]`, so a missing or
//! malformed value reaches the handler and is rejected as a 400 with the
//! field name, instead of surfacing as an extractor rejection. HTML forms
//! send unused filters as empty strings; those mean "no filter".

use std::str::FromStr;

use serde::Deserialize;
use uuid::Uuid;

use emb_status::{validate_filter, EntityKind, InvalidStatus};

use crate::error::{ApiError, ApiResult};

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArchivedQuery {
    pub show_archived: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderListQuery {
    pub client_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobListQuery {
    pub client_id: Option<String>,
    pub order_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoodsListQuery {
    pub owner_id: Option<String>,
    pub job_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentListQuery {
    pub client_id: Option<String>,
    pub order_id: Option<String>,
    pub provider: Option<String>,
}

// ---------------------------------------------------------------------------
// Form posts
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Empty means ACTIVE.
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub phone: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssetForm {
    pub filepath: String,
    pub original_filepath: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderAddForm {
    pub client_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderEditForm {
    pub status: String,
    pub client_address_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobAddForm {
    pub asset_id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub amount: String,
    pub price: String,
    pub complexity: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobEditForm {
    pub status: String,
    /// Empty keeps the stored asset.
    pub asset_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoodForm {
    pub job_id: String,
    pub employee_id: String,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub good_type: String,
    pub amount: String,
    pub unit: String,
    pub notes: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub price_total: String,
    pub provider: String,
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

pub fn required_uuid(field: &str, raw: &str) -> ApiResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request(format!("missing {field}")));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("invalid {field}")))
}

pub fn optional_uuid(field: &str, raw: Option<&str>) -> ApiResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_uuid(field, v).map(Some),
    }
}

pub fn required_text(field: &str, raw: &str) -> ApiResult<String> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(ApiError::bad_request(format!("missing {field}")));
    }
    Ok(v.to_string())
}

pub fn required_number<T: FromStr>(field: &str, raw: &str) -> ApiResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid {field}")))
}

/// A status-like code that must be present and registered.
pub fn required_code<T>(raw: &str) -> ApiResult<T>
where
    T: FromStr<Err = InvalidStatus>,
{
    Ok(raw.parse::<T>()?)
}

/// A list filter checked against the `kind` table: absent or the empty
/// "all" code means no filter.
pub fn filter_code<T>(kind: EntityKind, raw: Option<&str>) -> ApiResult<Option<T>>
where
    T: FromStr<Err = InvalidStatus>,
{
    let code = validate_filter(kind, &raw.unwrap_or_default().trim().to_ascii_lowercase())?;
    if code.is_empty() {
        return Ok(None);
    }
    Ok(Some(code.parse::<T>()?))
}

/// Empty means `default`.
pub fn code_or<T>(raw: &str, default: T) -> ApiResult<T>
where
    T: FromStr<Err = InvalidStatus>,
{
    if raw.trim().is_empty() {
        return Ok(default);
    }
    required_code(raw)
}

pub fn flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "on" | "yes")
    )
}
