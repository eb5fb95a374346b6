use anyhow::{Context, Result};
use models::{DocumentId, StoredPageComparison, StoredPageCorrection};
use sqlx::{Pool, Sqlite, sqlite::SqlitePoolOptions};

pub mod models;

use crate::config::database_config::DatabaseConfig;

#[derive(Clone, Debug)]
pub struct Database {
    connection_pool: Pool<Sqlite>,
}

impl Database {
    pub async fn try_new(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .test_before_acquire(true)
            .connect(&config.sqlite_url)
            .await
            .with_context(|| {
                format!(
                    "Cannot connect to database with url: {}",
                    &config.sqlite_url
                )
            })?;

        Self::create_schema(&pool).await?;

        Ok(Self {
            connection_pool: pool,
        })
    }

    async fn create_schema(pool: &Pool<Sqlite>) -> Result<()> {
        sqlx::query(
            r"
            create table if not exists page_comparisons (
                document_id text not null,
                page_number integer not null,
                original_text text not null,
                reference_text text not null,
                differences text not null,
                created_date text not null,
                primary key (document_id, page_number)
            )
            ",
        )
        .execute(pool)
        .await
        .context("Cannot create the page_comparisons table")?;

        sqlx::query(
            r"
            create table if not exists page_corrections (
                document_id text not null,
                page_number integer not null,
                content text not null,
                applied_indices text not null,
                ignored_indices text not null,
                updated_date text not null,
                primary key (document_id, page_number)
            )
            ",
        )
        .execute(pool)
        .await
        .context("Cannot create the page_corrections table")?;

        Ok(())
    }

    pub async fn upsert_page_comparison(&self, comparison: &StoredPageComparison) -> Result<()> {
        sqlx::query(
            r"
            insert into page_comparisons
                (document_id, page_number, original_text, reference_text, differences, created_date)
            values (?, ?, ?, ?, ?, ?)
            on conflict (document_id, page_number) do update set
                original_text = excluded.original_text,
                reference_text = excluded.reference_text,
                differences = excluded.differences,
                created_date = excluded.created_date
            ",
        )
        .bind(comparison.document_id)
        .bind(comparison.page_number)
        .bind(&comparison.original_text)
        .bind(&comparison.reference_text)
        .bind(&comparison.differences)
        .bind(comparison.created_date)
        .execute(&self.connection_pool)
        .await
        .context("Cannot upsert page comparison")?;

        Ok(())
    }

    pub async fn get_page_comparison(
        &self,
        document: &DocumentId,
        page_number: i64,
    ) -> Result<Option<StoredPageComparison>> {
        sqlx::query_as(
            r"
            select document_id, page_number, original_text, reference_text, differences, created_date
            from page_comparisons
            where document_id = ? and page_number = ?
            ",
        )
        .bind(document)
        .bind(page_number)
        .fetch_optional(&self.connection_pool)
        .await
        .context("Cannot fetch page comparison")
    }

    pub async fn upsert_page_correction(&self, correction: &StoredPageCorrection) -> Result<()> {
        sqlx::query(
            r"
            insert into page_corrections
                (document_id, page_number, content, applied_indices, ignored_indices, updated_date)
            values (?, ?, ?, ?, ?, ?)
            on conflict (document_id, page_number) do update set
                content = excluded.content,
                applied_indices = excluded.applied_indices,
                ignored_indices = excluded.ignored_indices,
                updated_date = excluded.updated_date
            ",
        )
        .bind(correction.document_id)
        .bind(correction.page_number)
        .bind(&correction.content)
        .bind(&correction.applied_indices)
        .bind(&correction.ignored_indices)
        .bind(correction.updated_date)
        .execute(&self.connection_pool)
        .await
        .context("Cannot upsert page correction")?;

        Ok(())
    }

    pub async fn get_page_corrections(
        &self,
        document: &DocumentId,
    ) -> Result<Vec<StoredPageCorrection>> {
        sqlx::query_as(
            r"
            select document_id, page_number, content, applied_indices, ignored_indices, updated_date
            from page_corrections
            where document_id = ?
            order by page_number
            ",
        )
        .bind(document)
        .fetch_all(&self.connection_pool)
        .await
        .context("Cannot fetch page corrections")
    }

    /// Remove everything stored for a document. Returns how many comparison
    /// and correction rows were deleted.
    pub async fn delete_document(&self, document: &DocumentId) -> Result<(u64, u64)> {
        let comparisons = sqlx::query("delete from page_comparisons where document_id = ?")
            .bind(document)
            .execute(&self.connection_pool)
            .await
            .context("Cannot delete page comparisons")?
            .rows_affected();

        let corrections = sqlx::query("delete from page_corrections where document_id = ?")
            .bind(document)
            .execute(&self.connection_pool)
            .await
            .context("Cannot delete page corrections")?
            .rows_affected();

        Ok((comparisons, corrections))
    }
}
