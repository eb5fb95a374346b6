use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{app_state::AppState, auth::auth, responses::FinalTextResponse};
use crate::{
    database::models::DocumentId,
    errors::{CollateServerError, server_error},
};

// This is required for aide to infer the path parameter types and names
#[derive(Deserialize, JsonSchema)]
pub struct PathParams {
    document_id: DocumentId,
}

/// The corrected text of the whole document, page by page, for final review
/// or export.
#[axum::debug_handler]
pub async fn fetch_final_text(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    Path(PathParams { document_id }): Path<PathParams>,
    State(state): State<AppState>,
) -> Result<Json<FinalTextResponse>, CollateServerError> {
    auth(&state, auth_header.token())?;

    let rows = state
        .database
        .get_page_corrections(&document_id)
        .await
        .map_err(server_error)?;

    let last_update_date = rows.iter().map(|row| row.updated_date).max();
    let corrected_content_by_page = rows
        .into_iter()
        .map(|row| (row.page_number as u32, row.content))
        .collect();

    Ok(Json(FinalTextResponse {
        document_id,
        corrected_content_by_page,
        last_update_date,
    }))
}
