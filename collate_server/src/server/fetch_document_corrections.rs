use std::collections::BTreeMap;

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

use super::{
    app_state::AppState,
    auth::auth,
    responses::{DocumentCorrectionsResponse, SavedPageResponse},
};
use crate::{
    database::models::DocumentId,
    errors::{CollateServerError, server_error},
};

// This is required for aide to infer the path parameter types and names
#[derive(Deserialize, JsonSchema)]
pub struct PathParams {
    document_id: DocumentId,
}

#[axum::debug_handler]
pub async fn fetch_document_corrections(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    Path(PathParams { document_id }): Path<PathParams>,
    State(state): State<AppState>,
) -> Result<Json<DocumentCorrectionsResponse>, CollateServerError> {
    auth(&state, auth_header.token())?;

    let rows = state
        .database
        .get_page_corrections(&document_id)
        .await
        .map_err(server_error)?;

    let last_update_date = rows.iter().map(|row| row.updated_date).max();

    let mut corrections = BTreeMap::new();
    for row in rows {
        let applied_indices = row.applied().map_err(server_error)?;
        let ignored_indices = row.ignored().map_err(server_error)?;

        corrections.insert(
            row.page_number as u32,
            SavedPageResponse {
                text: row.content,
                applied_indices,
                ignored_indices,
                updated_date: row.updated_date,
            },
        );
    }

    Ok(Json(DocumentCorrectionsResponse {
        document_id,
        corrections,
        last_update_date,
    }))
}
