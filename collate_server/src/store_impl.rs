//! The session-facing seams, implemented directly on [`Database`]: an
//! embedded [`collate_session::CorrectionSession`] can run straight against
//! the store without going through HTTP.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use collate::PageComparisonSnapshot;
use collate_session::{ComparisonProvider, CorrectionStore, DocumentId, PageNumber, SavedPage};

use crate::database::{Database, models::StoredPageCorrection};

impl CorrectionStore for Database {
    async fn save(
        &self,
        document: DocumentId,
        page: PageNumber,
        correction: &SavedPage,
    ) -> Result<()> {
        let row = StoredPageCorrection {
            document_id: document,
            page_number: i64::from(page),
            content: correction.text.clone(),
            applied_indices: serde_json::to_string(&correction.applied)
                .context("Failed to serialize applied indices")?,
            ignored_indices: serde_json::to_string(&correction.ignored)
                .context("Failed to serialize ignored indices")?,
            updated_date: Utc::now(),
        };

        self.upsert_page_correction(&row).await
    }

    async fn load(&self, document: DocumentId) -> Result<BTreeMap<PageNumber, SavedPage>> {
        self.get_page_corrections(&document)
            .await?
            .into_iter()
            .map(|row| {
                Ok((
                    row.page_number as PageNumber,
                    SavedPage {
                        applied: row.applied()?,
                        ignored: row.ignored()?,
                        text: row.content,
                    },
                ))
            })
            .collect()
    }
}

impl ComparisonProvider for Database {
    async fn fetch(&self, document: DocumentId, page: PageNumber) -> Result<PageComparisonSnapshot> {
        let stored = self
            .get_page_comparison(&document, i64::from(page))
            .await?
            .with_context(|| {
                format!("No comparison snapshot for page {page} of document {document}")
            })?;

        Ok(PageComparisonSnapshot {
            differences: stored.differences()?,
            original_text: stored.original_text,
            reference_text: stored.reference_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use collate::{Difference, DifferenceKind, DifferenceStatus};
    use collate_session::CorrectionSession;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::{config::database_config::DatabaseConfig, database::models::StoredPageComparison};

    async fn in_memory_database() -> Database {
        Database::try_new(&DatabaseConfig {
            sqlite_url: "sqlite::memory:".to_owned(),
            // Every connection to `:memory:` is its own database.
            max_connections: 1,
        })
        .await
        .expect("in-memory database")
    }

    async fn seed_comparison(database: &Database, document: DocumentId, page: i64) {
        let differences = vec![
            Difference {
                index: 0,
                kind: DifferenceKind::Replace,
                original_segment: "Helllo".to_owned(),
                suggested_segment: "Hello".to_owned(),
                start_offset: 0,
                end_offset: 6,
            },
            Difference {
                index: 1,
                kind: DifferenceKind::Replace,
                original_segment: "wrold".to_owned(),
                suggested_segment: "world".to_owned(),
                start_offset: 7,
                end_offset: 12,
            },
        ];

        database
            .upsert_page_comparison(&StoredPageComparison {
                document_id: document,
                page_number: page,
                original_text: "Helllo wrold".to_owned(),
                reference_text: "Hello world".to_owned(),
                differences: serde_json::to_string(&differences).expect("serialize"),
                created_date: Utc::now(),
            })
            .await
            .expect("seed comparison");
    }

    #[tokio::test]
    async fn test_corrections_round_trip_through_sqlite() {
        let database = in_memory_database().await;
        let document = Uuid::new_v4();

        let correction = SavedPage {
            text: "Hello wrold".to_owned(),
            applied: vec![0],
            ignored: vec![1],
        };
        database
            .save(document, 1, &correction)
            .await
            .expect("save");

        let loaded = database.load(document).await.expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[&1], correction);

        // Saving the same page again replaces, not duplicates.
        let updated = SavedPage {
            text: "Hello world".to_owned(),
            applied: vec![0, 1],
            ignored: vec![],
        };
        database.save(document, 1, &updated).await.expect("save");

        let loaded = database.load(document).await.expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[&1], updated);
    }

    #[tokio::test]
    async fn test_fetching_a_missing_comparison_fails() {
        let database = in_memory_database().await;

        let result = database.fetch(Uuid::new_v4(), 1).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_document_drops_both_tables() {
        let database = in_memory_database().await;
        let document = Uuid::new_v4();

        seed_comparison(&database, document, 1).await;
        database
            .save(document, 1, &SavedPage::default())
            .await
            .expect("save");

        let (comparisons, corrections) = database
            .delete_document(&document)
            .await
            .expect("delete");

        assert_eq!((comparisons, corrections), (1, 1));
        assert!(database.load(document).await.expect("load").is_empty());
    }

    /// The whole stack at once: a session runs against the sqlite store,
    /// decisions get autosaved, and a second session resumes from them.
    #[tokio::test]
    async fn test_a_session_runs_and_resumes_against_the_store() {
        let database = in_memory_database().await;
        let document = Uuid::new_v4();
        seed_comparison(&database, document, 1).await;

        let mut session = CorrectionSession::open(database.clone(), database.clone(), document)
            .await
            .expect("open");

        session.apply_difference(0).expect("apply");
        session.ignore_difference(1).expect("ignore");
        assert_eq!(session.page().editable_text(), "Hello wrold");

        session.finish().await.expect("finish");

        let resumed = CorrectionSession::open(database.clone(), database, document)
            .await
            .expect("resume");

        let page = resumed.page();
        assert_eq!(page.editable_text(), "Hello wrold");
        assert_eq!(page.status(0), Some(DifferenceStatus::Applied));
        assert_eq!(page.status(1), Some(DifferenceStatus::Ignored));
        assert!(!page.is_dirty());
    }
}
