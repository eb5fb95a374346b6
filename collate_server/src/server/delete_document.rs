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

use super::{app_state::AppState, auth::auth, responses::DocumentDeleted};
use crate::{
    database::models::DocumentId,
    errors::{CollateServerError, not_found_error, server_error},
};

// This is required for aide to infer the path parameter types and names
#[derive(Deserialize, JsonSchema)]
pub struct PathParams {
    document_id: DocumentId,
}

#[axum::debug_handler]
pub async fn delete_document(
    TypedHeader(auth_header): TypedHeader<Authorization<Bearer>>,
    Path(PathParams { document_id }): Path<PathParams>,
    State(state): State<AppState>,
) -> Result<Json<DocumentDeleted>, CollateServerError> {
    auth(&state, auth_header.token())?;

    let (deleted_comparisons, deleted_corrections) = state
        .database
        .delete_document(&document_id)
        .await
        .map_err(server_error)?;

    if deleted_comparisons == 0 && deleted_corrections == 0 {
        return Err(not_found_error(anyhow!(
            "Document `{}` has no stored data",
            document_id
        )));
    }

    Ok(Json(DocumentDeleted {
        document_id,
        deleted_comparisons,
        deleted_corrections,
    }))
}
