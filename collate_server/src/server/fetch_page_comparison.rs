use anyhow::anyhow;
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

use super::{app_state::AppState, auth::auth, responses::PageComparisonResponse};
use crate::{
    database::models::DocumentId,
    errors::{CollateServerError, not_found_error, server_error},
};

// This is required for aide to infer the path parameter types and names
#[derive(Deserialize, JsonSchema)]
pub struct PathParams {
    document_id: DocumentId,
    page_number: u32,
}

#[axum::debug_handler]
pub async fn fetch_page_comparison(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    Path(PathParams {
        document_id,
        page_number,
    }): Path<PathParams>,
    State(state): State<AppState>,
) -> Result<Json<PageComparisonResponse>, CollateServerError> {
    auth(&state, auth_header.token())?;

    let comparison = state
        .database
        .get_page_comparison(&document_id, i64::from(page_number))
        .await
        .map_err(server_error)?
        .map(Ok)
        .unwrap_or_else(|| {
            Err(not_found_error(anyhow!(
                "No comparison snapshot for page `{}` of document `{}`",
                page_number,
                document_id
            )))
        })?;

    let differences = comparison.differences().map_err(server_error)?;

    Ok(Json(PageComparisonResponse {
        document_id,
        page_number,
        original_text: comparison.original_text,
        reference_text: comparison.reference_text,
        differences: differences.into_iter().map(Into::into).collect(),
    }))
}
