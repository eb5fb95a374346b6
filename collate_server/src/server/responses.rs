use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use collate::{Difference, DifferenceIndex, classify};
use schemars::JsonSchema;
use serde::{self, Serialize};

use super::requests::DifferenceKindUpload;
use crate::database::models::DocumentId;

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub server_version: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonIngested {
    pub document_id: DocumentId,
    pub page_number: u32,
    pub difference_count: usize,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageComparisonResponse {
    pub document_id: DocumentId,
    pub page_number: u32,
    pub original_text: String,
    pub reference_text: String,
    pub differences: Vec<AssessedDifference>,
}

/// One difference plus everything the reviewer sees about it.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessedDifference {
    pub index: DifferenceIndex,

    #[serde(rename = "type")]
    pub kind: DifferenceKindUpload,
    pub original_segment: String,
    pub suggested_segment: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub category: String,
    pub category_description: String,
    pub similarity: f64,
    pub confidence: ConfidenceTierResponse,
}

#[derive(Debug, Clone, Copy, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTierResponse {
    High,
    Medium,
    Low,
}

impl From<Difference> for AssessedDifference {
    fn from(difference: Difference) -> Self {
        let assessment = classify::assess(&difference);

        Self {
            index: difference.index,
            kind: difference.kind.into(),
            original_segment: difference.original_segment,
            suggested_segment: difference.suggested_segment,
            start_offset: difference.start_offset,
            end_offset: difference.end_offset,
            category: assessment.category.slug().to_owned(),
            category_description: assessment.category.description().to_owned(),
            similarity: assessment.similarity,
            confidence: match assessment.tier {
                classify::ConfidenceTier::High => ConfidenceTierResponse::High,
                classify::ConfidenceTier::Medium => ConfidenceTierResponse::Medium,
                classify::ConfidenceTier::Low => ConfidenceTierResponse::Low,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageCorrectionSaved {
    pub document_id: DocumentId,
    pub page_number: u32,

    /// A short snippet of what was just stored, for quick visual
    /// confirmation in clients.
    pub corrected_text_preview: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCorrectionsResponse {
    pub document_id: DocumentId,
    pub corrections: BTreeMap<u32, SavedPageResponse>,
    pub last_update_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedPageResponse {
    pub text: String,
    pub applied_indices: Vec<DifferenceIndex>,
    pub ignored_indices: Vec<DifferenceIndex>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalTextResponse {
    pub document_id: DocumentId,
    pub corrected_content_by_page: BTreeMap<u32, String>,
    pub last_update_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDeleted {
    pub document_id: DocumentId,
    pub deleted_comparisons: u64,
    pub deleted_corrections: u64,
}
