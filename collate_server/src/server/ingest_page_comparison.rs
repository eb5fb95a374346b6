use std::collections::HashSet;

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
use collate::{Difference, content::TextContent};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{
    app_state::AppState, auth::auth, requests::IngestPageComparison,
    responses::ComparisonIngested,
};
use crate::{
    database::models::{DocumentId, StoredPageComparison},
    errors::{CollateServerError, client_error, server_error},
};

// This is required for aide to infer the path parameter types and names
#[derive(Deserialize, JsonSchema)]
pub struct PathParams {
    document_id: DocumentId,
    page_number: u32,
}

#[axum::debug_handler]
pub async fn ingest_page_comparison(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    Path(PathParams {
        document_id,
        page_number,
    }): Path<PathParams>,
    State(state): State<AppState>,
    Json(request): Json<IngestPageComparison>,
) -> Result<Json<ComparisonIngested>, CollateServerError> {
    auth(&state, auth_header.token())?;

    let differences: Vec<Difference> = request.differences.into_iter().map(Into::into).collect();
    validate_differences(&differences).map_err(client_error)?;

    let difference_count = differences.len();
    let comparison = StoredPageComparison {
        document_id,
        page_number: i64::from(page_number),
        original_text: TextContent::from(request.original).resolve(),
        reference_text: TextContent::from(request.reference).resolve(),
        differences: serde_json::to_string(&differences)
            .context("Failed to serialize differences")
            .map_err(server_error)?,
        created_date: Utc::now(),
    };

    state
        .database
        .upsert_page_comparison(&comparison)
        .await
        .map_err(server_error)?;

    Ok(Json(ComparisonIngested {
        document_id,
        page_number,
        difference_count,
    }))
}

fn validate_differences(differences: &[Difference]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();

    for difference in differences {
        if !seen.insert(difference.index) {
            return Err(anyhow!(
                "Difference index `{}` appears more than once",
                difference.index
            ));
        }

        if difference.end_offset < difference.start_offset {
            return Err(anyhow!(
                "Difference `{}` has an inverted offset range",
                difference.index
            ));
        }
    }

    Ok(())
}
