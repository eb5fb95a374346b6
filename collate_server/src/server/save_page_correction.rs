use anyhow::{Context, anyhow};
use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{
    app_state::AppState, auth::auth, requests::SavePageCorrection,
    responses::PageCorrectionSaved,
};
use crate::{
    database::models::{DocumentId, StoredPageCorrection},
    errors::{CollateServerError, not_found_error, server_error},
};

const PREVIEW_CHARACTER_COUNT: usize = 100;

// This is required for aide to infer the path parameter types and names
#[derive(Deserialize, JsonSchema)]
pub struct PathParams {
    document_id: DocumentId,
    page_number: u32,
}

#[axum::debug_handler]
pub async fn save_page_correction(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    Path(PathParams {
        document_id,
        page_number,
    }): Path<PathParams>,
    State(state): State<AppState>,
    Json(request): Json<SavePageCorrection>,
) -> Result<Json<PageCorrectionSaved>, CollateServerError> {
    auth(&state, auth_header.token())?;

    // Corrections only make sense against an ingested comparison.
    state
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

    let correction = StoredPageCorrection {
        document_id,
        page_number: i64::from(page_number),
        content: request.text.clone(),
        applied_indices: serde_json::to_string(&request.applied_indices)
            .context("Failed to serialize applied indices")
            .map_err(server_error)?,
        ignored_indices: serde_json::to_string(&request.ignored_indices)
            .context("Failed to serialize ignored indices")
            .map_err(server_error)?,
        updated_date: Utc::now(),
    };

    state
        .database
        .upsert_page_correction(&correction)
        .await
        .map_err(server_error)?;

    Ok(Json(PageCorrectionSaved {
        document_id,
        page_number,
        corrected_text_preview: request.text.chars().take(PREVIEW_CHARACTER_COUNT).collect(),
    }))
}
