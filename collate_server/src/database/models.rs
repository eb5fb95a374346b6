use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use collate::Difference;
use sqlx::FromRow;

pub type DocumentId = uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct StoredPageComparison {
    pub document_id: DocumentId,
    pub page_number: i64,
    pub original_text: String,
    pub reference_text: String,

    /// JSON-encoded difference list; stays opaque to the database layer.
    pub differences: String,
    pub created_date: DateTime<Utc>,
}

impl StoredPageComparison {
    pub fn differences(&self) -> Result<Vec<Difference>> {
        serde_json::from_str(&self.differences).context("Failed to parse stored differences")
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StoredPageCorrection {
    pub document_id: DocumentId,
    pub page_number: i64,
    pub content: String,

    /// JSON-encoded index lists.
    pub applied_indices: String,
    pub ignored_indices: String,
    pub updated_date: DateTime<Utc>,
}

impl StoredPageCorrection {
    pub fn applied(&self) -> Result<Vec<u32>> {
        serde_json::from_str(&self.applied_indices).context("Failed to parse applied indices")
    }

    pub fn ignored(&self) -> Result<Vec<u32>> {
        serde_json::from_str(&self.ignored_indices).context("Failed to parse ignored indices")
    }
}
