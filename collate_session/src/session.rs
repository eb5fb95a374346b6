//! The operation surface a presentation layer drives: one
//! [`CorrectionSession`] per open document.
//!
//! The session owns a [`PageReconciliation`] per visited page (snapshots are
//! fetched at most once and cached), forwards the reviewer's decisions to
//! the engine, queues every dirtying mutation with the autosave worker, and
//! guards navigation against unsaved state. All of its logging happens
//! inside one `tracing` span scoped to the session, so records from
//! concurrent documents never mingle.

use std::collections::{BTreeMap, HashMap};

use collate::{
    CollateError, DifferenceIndex, DifferenceStatus, PageReconciliation,
    classify::Assessment, reconciliation::BulkOutcome,
};
use log::{debug, warn};
use tracing::Span;

use crate::{
    autosave::{AutosaveEvent, Autosaver, DEFAULT_QUIET_PERIOD},
    errors::SessionError,
    store::{ComparisonProvider, CorrectionStore, DocumentId, PageNumber, SavedPage},
};

/// The user's answer to a failed save during navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Attempt the save again, then navigate if it lands.
    Retry,
    /// Lose the unsaved changes and navigate anyway.
    Discard,
    /// Stay on the page; it remains dirty.
    Cancel,
}

#[derive(Debug)]
pub struct CorrectionSession<P> {
    provider: P,
    document: DocumentId,
    pages: HashMap<PageNumber, PageReconciliation>,
    saved: BTreeMap<PageNumber, SavedPage>,
    current_page: PageNumber,
    autosaver: Autosaver,
    span: Span,
}

impl<P> CorrectionSession<P>
where
    P: ComparisonProvider,
{
    /// Open a document for reconciliation, resuming from any previously
    /// saved corrections. A failed corrections load is non-fatal (the
    /// session starts fresh); a failed comparison fetch for the first page
    /// is fatal — no session is created.
    ///
    /// # Errors
    ///
    /// `LoadFailure` when the first page's comparison cannot be fetched.
    pub async fn open<S>(provider: P, store: S, document: DocumentId) -> Result<Self, SessionError>
    where
        S: CorrectionStore + 'static,
    {
        let span = tracing::info_span!("correction_session", document = %document);

        let saved = match store.load(document).await {
            Ok(saved) => saved,
            Err(error) => {
                span.in_scope(|| {
                    warn!("No saved corrections available for document {document}: {error:#}");
                });
                BTreeMap::new()
            }
        };

        let autosaver = Autosaver::spawn(store, document, DEFAULT_QUIET_PERIOD);

        let mut session = Self {
            provider,
            document,
            pages: HashMap::new(),
            saved,
            current_page: 1,
            autosaver,
            span,
        };
        session.load_page(1).await?;

        Ok(session)
    }

    #[must_use]
    pub const fn document(&self) -> DocumentId { self.document }

    #[must_use]
    pub const fn current_page(&self) -> PageNumber { self.current_page }

    /// Read-only view of the current page's reconciliation state, for
    /// rendering.
    #[must_use]
    pub fn page(&self) -> &PageReconciliation {
        self.pages
            .get(&self.current_page)
            .expect("the current page is always loaded before it becomes current")
    }

    /// Reviewer-facing scoring for the current page's differences.
    #[must_use]
    pub fn assessments(&self) -> Vec<(DifferenceIndex, Assessment)> { self.page().assessments() }

    /// # Errors
    ///
    /// Propagates the engine's verdict; `PatchMiss` and `InvalidTransition`
    /// are non-fatal and leave the page unchanged.
    pub fn apply_difference(&mut self, index: DifferenceIndex) -> Result<(), CollateError> {
        self.mutate("apply difference", |state| state.apply_difference(index))
    }

    /// # Errors
    ///
    /// See [`Self::apply_difference`].
    pub fn ignore_difference(&mut self, index: DifferenceIndex) -> Result<(), CollateError> {
        self.mutate("ignore difference", |state| state.ignore_difference(index))
    }

    /// # Errors
    ///
    /// See [`Self::apply_difference`].
    pub fn revert_difference(&mut self, index: DifferenceIndex) -> Result<(), CollateError> {
        self.mutate("revert difference", |state| state.revert_difference(index))
    }

    /// # Errors
    ///
    /// See [`Self::apply_difference`].
    pub fn apply_all(&mut self) -> Result<BulkOutcome, CollateError> {
        let outcome = self.mutate("apply all", PageReconciliation::apply_all)?;

        if !outcome.missed.is_empty() {
            self.span.in_scope(|| {
                warn!(
                    "Could not locate {} difference(s) on page {}: {:?}",
                    outcome.missed.len(),
                    self.current_page,
                    outcome.missed
                );
            });
        }

        Ok(outcome)
    }

    pub fn ignore_all(&mut self) {
        let _ = self.mutate("ignore all", |state| {
            state.ignore_all();
            Ok(())
        });
    }

    pub fn replace_all(&mut self) {
        let _ = self.mutate("replace all", |state| {
            state.replace_all();
            Ok(())
        });
    }

    /// Discards decisions and edits; deliberately does not queue a save —
    /// the page is defined to be clean after a reset, so any payload still
    /// waiting on the debounce timer is dropped along with it.
    pub fn reset_to_original(&mut self) {
        self.state_mut().reset_to_original();
        self.autosaver.discard_pending();
        self.span
            .in_scope(|| debug!("Reset page to the original text"));
    }

    pub fn set_text(&mut self, new_text: impl Into<String>) {
        let _ = self.mutate("free-form edit", |state| {
            state.set_text(new_text);
            Ok(())
        });
    }

    /// Drain autosave outcomes, marking pages clean for every save that
    /// still matches their buffer. Returns the events for the UI (a failed
    /// save must surface an alert).
    pub fn pump_autosave_events(&mut self) -> Vec<AutosaveEvent> {
        let events = self.autosaver.try_events();

        for event in &events {
            if let AutosaveEvent::Saved { page, correction } = event {
                if let Some(state) = self.pages.get_mut(page) {
                    state.mark_persisted(&correction.text);
                }
            }
        }

        events
    }

    /// Navigate to another page, synchronously flushing any unsaved state
    /// first. On a failed flush the session stays on the current page and
    /// the caller must come back with a [`NavigationDecision`].
    ///
    /// # Errors
    ///
    /// `SaveFailure` when the pre-navigation flush fails; `LoadFailure` when
    /// the target page's comparison cannot be fetched.
    pub async fn goto_page(&mut self, page: PageNumber) -> Result<(), SessionError> {
        if self.page().is_dirty() {
            self.flush().await?;
        }

        self.load_page(page).await?;
        self.current_page = page;
        self.span
            .in_scope(|| debug!("Navigated to page {page}"));

        Ok(())
    }

    /// Resolve a navigation that was blocked by a failed save. Returns
    /// whether the navigation went through.
    ///
    /// # Errors
    ///
    /// `SaveFailure` when a retried flush fails again; `LoadFailure` when
    /// the target page's comparison cannot be fetched.
    pub async fn resolve_navigation(
        &mut self,
        page: PageNumber,
        decision: NavigationDecision,
    ) -> Result<bool, SessionError> {
        match decision {
            NavigationDecision::Cancel => Ok(false),
            NavigationDecision::Retry => {
                self.goto_page(page).await?;
                Ok(true)
            }
            NavigationDecision::Discard => {
                self.autosaver.discard_pending();
                self.load_page(page).await?;
                self.current_page = page;
                Ok(true)
            }
        }
    }

    /// Flush unsaved state and end the session.
    ///
    /// # Errors
    ///
    /// `SaveFailure` when the final flush fails; the session is consumed
    /// regardless.
    pub async fn finish(mut self) -> Result<(), SessionError> {
        if self.page().is_dirty() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SessionError> {
        let result = self.autosaver.flush().await;
        self.pump_autosave_events();
        result
    }

    async fn load_page(&mut self, page: PageNumber) -> Result<(), SessionError> {
        if self.pages.contains_key(&page) {
            return Ok(());
        }

        let snapshot = self
            .provider
            .fetch(self.document, page)
            .await
            .map_err(|source| SessionError::LoadFailure {
                document: self.document,
                page,
                source,
            })?;

        let mut state = PageReconciliation::new(snapshot);
        if let Some(saved) = self.saved.get(&page) {
            state.restore(saved.text.clone(), &saved.applied, &saved.ignored);
            self.span
                .in_scope(|| debug!("Restored page {page} from saved corrections"));
        }

        self.pages.insert(page, state);
        Ok(())
    }

    /// Run one engine operation on the current page; queue a save when it
    /// dirtied the buffer.
    fn mutate<T>(
        &mut self,
        operation: &str,
        action: impl FnOnce(&mut PageReconciliation) -> Result<T, CollateError>,
    ) -> Result<T, CollateError> {
        let page = self.current_page;
        let result = action(self.state_mut());

        self.span.in_scope(|| match &result {
            Ok(_) => debug!("{operation} on page {page}"),
            Err(CollateError::PatchMiss(segment)) => {
                warn!("{operation} on page {page} missed its segment `{segment}`");
            }
            Err(error) => debug!("{operation} on page {page} rejected: {error}"),
        });

        if result.is_ok() && self.page().is_dirty() {
            self.queue_save();
        }

        result
    }

    fn queue_save(&mut self) {
        let page = self.current_page;
        let state = self.page();
        let correction = SavedPage {
            text: state.editable_text().to_owned(),
            applied: state.indices_with_status(DifferenceStatus::Applied),
            ignored: state.indices_with_status(DifferenceStatus::Ignored),
        };

        self.autosaver.text_changed(page, correction);
    }

    fn state_mut(&mut self) -> &mut PageReconciliation {
        self.pages
            .get_mut(&self.current_page)
            .expect("the current page is always loaded before it becomes current")
    }
}
