use thiserror::Error;

use crate::store::{DocumentId, PageNumber};

#[derive(Error, Debug)]
pub enum SessionError {
    /// Persistence failed. The page stays dirty; the caller must choose to
    /// retry, discard the pending changes, or cancel whatever prompted the
    /// save. Failures are surfaced, never silently retried.
    #[error("Failed to save page {page} of document {document}")]
    SaveFailure {
        document: DocumentId,
        page: PageNumber,
        #[source]
        source: anyhow::Error,
    },

    /// The comparison snapshot could not be fetched. No reconciliation state
    /// exists for the page — there is no partial state to render.
    #[error("Failed to load the comparison for page {page} of document {document}")]
    LoadFailure {
        document: DocumentId,
        page: PageNumber,
        #[source]
        source: anyhow::Error,
    },
}
