use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use emb_db::{ClientRow, NewAddress, NewAsset, NewClient};
use emb_status::RecordStatus;
use tracing::info;

use crate::{
    api_types::ClientDetailResponse,
    error::ApiResult,
    forms::{
        code_or, flag, required_text, required_uuid, AddressForm, ArchivedQuery, AssetForm,
        ClientForm,
    },
    state::AppState,
};

fn client_fields(form: &ClientForm) -> ApiResult<NewClient> {
    Ok(NewClient {
        first_name: required_text("first_name", &form.first_name)?,
        last_name: required_text("last_name", &form.last_name)?,
        email: required_text("email", &form.email)?,
        status: code_or(&form.status, RecordStatus::Active)?,
    })
}

// ---------------------------------------------------------------------------
// GET /clients
// ---------------------------------------------------------------------------

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ArchivedQuery>,
) -> ApiResult<Json<Vec<ClientRow>>> {
    let rows = emb_db::list_clients(&st.pool, flag(q.show_archived.as_deref())).await?;
    Ok(Json(rows))
}

// ---------------------------------------------------------------------------
// POST /clients/add
// ---------------------------------------------------------------------------

pub(crate) async fn add(
    State(st): State<Arc<AppState>>,
    Form(form): Form<ClientForm>,
) -> ApiResult<Redirect> {
    let client = client_fields(&form)?;
    let client_id = emb_db::insert_client(&st.pool, &client).await?;

    info!(%client_id, "client added");
    Ok(Redirect::to(&format!("/clients/{client_id}")))
}

// ---------------------------------------------------------------------------
// GET /clients/:client_id
// ---------------------------------------------------------------------------

pub(crate) async fn detail(
    State(st): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> ApiResult<Json<ClientDetailResponse>> {
    let client_id = required_uuid("client_id", &client_id)?;

    let client = emb_db::fetch_client(&st.pool, client_id).await?;
    let addresses = emb_db::list_addresses(&st.pool, Some(client_id), false).await?;
    let assets = emb_db::list_assets(&st.pool, Some(client_id), false).await?;

    Ok(Json(ClientDetailResponse {
        client,
        addresses,
        assets,
    }))
}

// ---------------------------------------------------------------------------
// POST /clients/:client_id
// ---------------------------------------------------------------------------

pub(crate) async fn edit(
    State(st): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    Form(form): Form<ClientForm>,
) -> ApiResult<Redirect> {
    let client_id = required_uuid("client_id", &client_id)?;
    let client = client_fields(&form)?;

    emb_db::update_client(&st.pool, client_id, &client).await?;
    Ok(Redirect::to(&format!("/clients/{client_id}")))
}

// ---------------------------------------------------------------------------
// POST /clients/:client_id/addresses
// ---------------------------------------------------------------------------

pub(crate) async fn add_address(
    State(st): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    Form(form): Form<AddressForm>,
) -> ApiResult<Redirect> {
    let client_id = required_uuid("client_id", &client_id)?;
    let address = NewAddress {
        name: required_text("name", &form.name)?,
        address_line1: required_text("address_line1", &form.address_line1)?,
        address_line2: form.address_line2.trim().to_string(),
        city: required_text("city", &form.city)?,
        state: required_text("state", &form.state)?,
        country: required_text("country", &form.country)?,
        zip_code: required_text("zip_code", &form.zip_code)?,
        phone: form.phone.trim().to_string(),
        status: code_or(&form.status, RecordStatus::Active)?,
    };

    emb_db::fetch_client(&st.pool, client_id).await?;
    emb_db::insert_address(&st.pool, client_id, &address).await?;
    Ok(Redirect::to(&format!("/clients/{client_id}")))
}

// ---------------------------------------------------------------------------
// POST /clients/:client_id/assets
// ---------------------------------------------------------------------------

pub(crate) async fn add_asset(
    State(st): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    Form(form): Form<AssetForm>,
) -> ApiResult<Redirect> {
    let client_id = required_uuid("client_id", &client_id)?;
    let filepath = required_text("filepath", &form.filepath)?;
    let original_filepath = match form.original_filepath.trim() {
        "" => filepath.clone(),
        other => other.to_string(),
    };
    let asset = NewAsset {
        filepath,
        original_filepath,
        status: code_or(&form.status, RecordStatus::Active)?,
    };

    emb_db::fetch_client(&st.pool, client_id).await?;
    emb_db::insert_asset(&st.pool, client_id, &asset).await?;
    Ok(Redirect::to(&format!("/clients/{client_id}")))
}
