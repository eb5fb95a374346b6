use std::{collections::BTreeMap, future::Future};

use collate::{DifferenceIndex, PageComparisonSnapshot};
use uuid::Uuid;

pub type DocumentId = Uuid;
pub type PageNumber = u32;

/// Everything that gets persisted for one page: the corrected text plus the
/// decision bookkeeping, so that a reconciliation session can resume exactly
/// where it left off.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedPage {
    pub text: String,
    pub applied: Vec<DifferenceIndex>,
    pub ignored: Vec<DifferenceIndex>,
}

/// Persistence seam for corrected pages.
pub trait CorrectionStore: Send + Sync {
    fn save(
        &self,
        document: DocumentId,
        page: PageNumber,
        correction: &SavedPage,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn load(
        &self,
        document: DocumentId,
    ) -> impl Future<Output = anyhow::Result<BTreeMap<PageNumber, SavedPage>>> + Send;
}

/// Source of page comparison snapshots. The diffing itself happens upstream;
/// a snapshot arrives precomputed and is fetched at most once per page and
/// session — revisits hit the session's cache.
pub trait ComparisonProvider: Send + Sync {
    fn fetch(
        &self,
        document: DocumentId,
        page: PageNumber,
    ) -> impl Future<Output = anyhow::Result<PageComparisonSnapshot>> + Send;
}
