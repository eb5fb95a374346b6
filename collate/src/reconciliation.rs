//! The per-page decision state machine.
//!
//! One [`PageReconciliation`] exists per (document, page). It owns the
//! editable text buffer and a status entry for every reconcilable
//! difference, and it is the only place those are mutated. Content-based
//! patching is the primary contract; offset-based splicing is used only
//! while the buffer is verifiably pristine, because recorded offsets stop
//! lining up as soon as any other difference has been applied.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    classify::{self, Assessment},
    difference::{Difference, DifferenceIndex},
    errors::CollateError,
    patch::{self, PatchStrategy},
    snapshot::PageComparisonSnapshot,
};

/// Review status of one difference.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferenceStatus {
    #[default]
    Pending,
    Applied,
    Ignored,
}

/// Page-level decision mode. Exactly one is active at a time. `Custom` is
/// the only mode under which individual difference toggles are independently
/// meaningful; `ReplacedAll` and `IgnoredAll` stand for a whole-page
/// decision.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkMode {
    #[default]
    None,
    Custom,
    ReplacedAll,
    IgnoredAll,
}

/// Result of an [`PageReconciliation::apply_all`] sweep: which differences
/// were patched in and which could not be located (and stay pending).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    pub applied: Vec<DifferenceIndex>,
    pub missed: Vec<DifferenceIndex>,
}

/// Decision state for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReconciliation {
    original_text: String,
    reference_text: String,
    editable_text: String,
    differences: Vec<Difference>,
    status: BTreeMap<DifferenceIndex, DifferenceStatus>,
    bulk_mode: BulkMode,
    dirty: bool,
}

impl PageReconciliation {
    #[must_use]
    pub fn new(snapshot: PageComparisonSnapshot) -> Self {
        let status = snapshot
            .reconcilable_differences()
            .map(|difference| (difference.index, DifferenceStatus::Pending))
            .collect();

        Self {
            editable_text: snapshot.original_text.clone(),
            original_text: snapshot.original_text,
            reference_text: snapshot.reference_text,
            differences: snapshot.differences,
            status,
            bulk_mode: BulkMode::None,
            dirty: false,
        }
    }

    /// Seed a resumed session from previously persisted state: the corrected
    /// text plus the applied/ignored bookkeeping. Indices that are not part
    /// of this page's reconcilable set are skipped. The page starts clean.
    pub fn restore(
        &mut self,
        text: String,
        applied: &[DifferenceIndex],
        ignored: &[DifferenceIndex],
    ) {
        for index in applied {
            if let Some(status) = self.status.get_mut(index) {
                *status = DifferenceStatus::Applied;
            }
        }

        for index in ignored {
            if let Some(status) = self.status.get_mut(index) {
                *status = DifferenceStatus::Ignored;
            }
        }

        let has_decisions = self
            .status
            .values()
            .any(|status| *status != DifferenceStatus::Pending);

        self.bulk_mode = if has_decisions || text != self.original_text {
            BulkMode::Custom
        } else {
            BulkMode::None
        };

        self.editable_text = text;
        self.dirty = false;
    }

    #[must_use]
    pub fn original_text(&self) -> &str { &self.original_text }

    #[must_use]
    pub fn reference_text(&self) -> &str { &self.reference_text }

    #[must_use]
    pub fn editable_text(&self) -> &str { &self.editable_text }

    #[must_use]
    pub fn differences(&self) -> &[Difference] { &self.differences }

    #[must_use]
    pub fn status(&self, index: DifferenceIndex) -> Option<DifferenceStatus> {
        self.status.get(&index).copied()
    }

    pub fn statuses(&self) -> impl Iterator<Item = (DifferenceIndex, DifferenceStatus)> + '_ {
        self.status.iter().map(|(index, status)| (*index, *status))
    }

    /// Indices of every difference currently in the given status.
    #[must_use]
    pub fn indices_with_status(&self, wanted: DifferenceStatus) -> Vec<DifferenceIndex> {
        self.status
            .iter()
            .filter(|(_, status)| **status == wanted)
            .map(|(index, _)| *index)
            .collect()
    }

    #[must_use]
    pub const fn bulk_mode(&self) -> BulkMode { self.bulk_mode }

    #[must_use]
    pub const fn is_dirty(&self) -> bool { self.dirty }

    /// Reviewer-facing scoring for every reconcilable difference.
    #[must_use]
    pub fn assessments(&self) -> Vec<(DifferenceIndex, Assessment)> {
        self.differences
            .iter()
            .filter(|difference| difference.is_reconcilable())
            .map(|difference| (difference.index, classify::assess(difference)))
            .collect()
    }

    /// Patch the difference's suggestion into the editable text. Valid only
    /// while the difference is `Pending` and the page is not under
    /// `ReplacedAll` (the buffer is then the wholesale reference text, which
    /// the difference's segments and offsets do not refer to).
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when the difference is not pending or the page is
    /// under `ReplacedAll`; `PatchMiss` when the segment cannot be located.
    /// Neither changes any state.
    pub fn apply_difference(&mut self, index: DifferenceIndex) -> Result<(), CollateError> {
        if self.bulk_mode == BulkMode::ReplacedAll {
            return Err(CollateError::InvalidTransition(format!(
                "cannot apply difference {index} while the whole page is replaced"
            )));
        }

        let difference = self.reconcilable(index)?.clone();
        if self.status[&index] != DifferenceStatus::Pending {
            return Err(CollateError::InvalidTransition(format!(
                "difference {index} is not pending"
            )));
        }

        self.editable_text = patch::apply(&self.editable_text, &difference, self.patch_strategy())?;
        self.status.insert(index, DifferenceStatus::Applied);
        self.dirty = true;

        if self.bulk_mode == BulkMode::None {
            self.bulk_mode = BulkMode::Custom;
        }

        Ok(())
    }

    /// Toggle a difference between `Ignored` and `Pending`. An `Applied`
    /// difference is reverted first. Un-ignoring never re-applies a patch —
    /// none was applied. Demotes `ReplacedAll`/`IgnoredAll` to `Custom`.
    ///
    /// # Errors
    ///
    /// `UnknownDifference` for indices outside the reconcilable set;
    /// `PatchMiss` when reverting an applied difference fails (the status is
    /// then left unchanged).
    pub fn ignore_difference(&mut self, index: DifferenceIndex) -> Result<(), CollateError> {
        let difference = self.reconcilable(index)?.clone();

        match self.status[&index] {
            DifferenceStatus::Ignored => {
                self.status.insert(index, DifferenceStatus::Pending);
            }
            DifferenceStatus::Pending => {
                self.status.insert(index, DifferenceStatus::Ignored);
            }
            DifferenceStatus::Applied => {
                self.editable_text =
                    patch::revert(&self.editable_text, &difference, PatchStrategy::Content)?;
                self.status.insert(index, DifferenceStatus::Ignored);
            }
        }

        self.dirty = true;

        if matches!(self.bulk_mode, BulkMode::ReplacedAll | BulkMode::IgnoredAll) {
            self.bulk_mode = BulkMode::Custom;
        }

        Ok(())
    }

    /// Undo an applied difference, restoring the original segment and the
    /// `Pending` status.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the difference is `Applied`; `PatchMiss`
    /// when the applied segment cannot be located.
    pub fn revert_difference(&mut self, index: DifferenceIndex) -> Result<(), CollateError> {
        let difference = self.reconcilable(index)?.clone();
        if self.status[&index] != DifferenceStatus::Applied {
            return Err(CollateError::InvalidTransition(format!(
                "difference {index} is not applied"
            )));
        }

        self.editable_text =
            patch::revert(&self.editable_text, &difference, PatchStrategy::Content)?;
        self.status.insert(index, DifferenceStatus::Pending);
        self.dirty = true;

        Ok(())
    }

    /// Apply every pending difference in ascending index order — not offset
    /// order, since recorded offsets stop being reliable after the first
    /// patch. Individual misses are collected, not fatal. A page with zero
    /// pending differences is left completely untouched.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` while the page is under `ReplacedAll`.
    pub fn apply_all(&mut self) -> Result<BulkOutcome, CollateError> {
        if self.bulk_mode == BulkMode::ReplacedAll {
            return Err(CollateError::InvalidTransition(
                "cannot apply differences while the whole page is replaced".to_owned(),
            ));
        }

        let pending = self.indices_with_status(DifferenceStatus::Pending);
        if pending.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let mut outcome = BulkOutcome::default();
        for index in pending {
            match self.apply_difference(index) {
                Ok(()) => outcome.applied.push(index),
                Err(CollateError::PatchMiss(_)) => outcome.missed.push(index),
                Err(other) => return Err(other),
            }
        }

        self.bulk_mode = BulkMode::Custom;

        Ok(outcome)
    }

    /// Whole-page decision: keep the OCR text as-is. The buffer is reset to
    /// the original in one step rather than reverting difference by
    /// difference, and every reconcilable difference is marked `Ignored`.
    pub fn ignore_all(&mut self) {
        self.editable_text = self.original_text.clone();
        for status in self.status.values_mut() {
            *status = DifferenceStatus::Ignored;
        }
        self.bulk_mode = BulkMode::IgnoredAll;
        self.dirty = true;
    }

    /// Whole-page decision: take the reference text wholesale. Per-difference
    /// statuses go back to `Pending` — the bulk replacement supersedes the
    /// granular bookkeeping.
    pub fn replace_all(&mut self) {
        self.editable_text = self.reference_text.clone();
        for status in self.status.values_mut() {
            *status = DifferenceStatus::Pending;
        }
        self.bulk_mode = BulkMode::ReplacedAll;
        self.dirty = true;
    }

    /// Discard every decision and edit; back to the untouched snapshot.
    pub fn reset_to_original(&mut self) {
        self.editable_text = self.original_text.clone();
        for status in self.status.values_mut() {
            *status = DifferenceStatus::Pending;
        }
        self.bulk_mode = BulkMode::None;
        self.dirty = false;
    }

    /// Free-form edit of the whole buffer. A text that matches neither the
    /// active bulk-mode target nor the original demotes
    /// `ReplacedAll`/`IgnoredAll` to `Custom`.
    pub fn set_text(&mut self, new_text: impl Into<String>) {
        let new_text = new_text.into();

        let bulk_target = match self.bulk_mode {
            BulkMode::ReplacedAll => Some(&self.reference_text),
            BulkMode::IgnoredAll => Some(&self.original_text),
            BulkMode::None | BulkMode::Custom => None,
        };

        if let Some(target) = bulk_target {
            if new_text != *target && new_text != self.original_text {
                self.bulk_mode = BulkMode::Custom;
            }
        }

        self.editable_text = new_text;
        self.dirty = true;
    }

    /// Called by the persistence coordinator once a save has landed. The
    /// page only becomes clean when the saved text still matches the buffer;
    /// an edit made while the save was in flight keeps it dirty.
    pub fn mark_persisted(&mut self, persisted_text: &str) {
        if self.editable_text == persisted_text {
            self.dirty = false;
        }
    }

    fn reconcilable(&self, index: DifferenceIndex) -> Result<&Difference, CollateError> {
        self.differences
            .iter()
            .find(|difference| difference.index == index && difference.is_reconcilable())
            .ok_or(CollateError::UnknownDifference(index))
    }

    fn patch_strategy(&self) -> PatchStrategy {
        if self.editable_text == self.original_text {
            PatchStrategy::Offset
        } else {
            PatchStrategy::Content
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::difference::DifferenceKind;

    fn helllo_wrold() -> PageReconciliation {
        PageReconciliation::new(PageComparisonSnapshot {
            original_text: "Helllo wrold".to_owned(),
            reference_text: "Hello world".to_owned(),
            differences: vec![
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
            ],
        })
    }

    #[test]
    fn test_apply_apply_revert_in_any_order() {
        let mut page = helllo_wrold();

        page.apply_difference(0).expect("first apply");
        assert_eq!(page.editable_text(), "Hello wrold");
        assert_eq!(page.status(0), Some(DifferenceStatus::Applied));
        assert_eq!(page.bulk_mode(), BulkMode::Custom);

        page.apply_difference(1).expect("second apply");
        assert_eq!(page.editable_text(), "Hello world");
        assert_eq!(page.status(1), Some(DifferenceStatus::Applied));

        page.revert_difference(0).expect("revert");
        assert_eq!(page.editable_text(), "Helllo world");
        assert_eq!(page.status(0), Some(DifferenceStatus::Pending));
        assert!(page.is_dirty());
    }

    #[test]
    fn test_applying_twice_is_rejected_without_state_change() {
        let mut page = helllo_wrold();
        page.apply_difference(0).expect("apply");
        let before = page.clone();

        let result = page.apply_difference(0);

        assert!(matches!(result, Err(CollateError::InvalidTransition(_))));
        assert_eq!(page, before);
    }

    #[test]
    fn test_reverting_a_pending_difference_is_rejected() {
        let mut page = helllo_wrold();

        assert!(matches!(
            page.revert_difference(1),
            Err(CollateError::InvalidTransition(_))
        ));
        assert_eq!(page.editable_text(), "Helllo wrold");
    }

    #[test]
    fn test_ignore_toggles_and_reverts_an_applied_patch() {
        let mut page = helllo_wrold();

        page.ignore_difference(0).expect("ignore");
        assert_eq!(page.status(0), Some(DifferenceStatus::Ignored));
        assert_eq!(page.editable_text(), "Helllo wrold");

        page.ignore_difference(0).expect("un-ignore");
        assert_eq!(page.status(0), Some(DifferenceStatus::Pending));

        page.apply_difference(0).expect("apply");
        page.ignore_difference(0).expect("ignore applied");
        assert_eq!(page.status(0), Some(DifferenceStatus::Ignored));
        assert_eq!(page.editable_text(), "Helllo wrold");
    }

    #[test]
    fn test_apply_all_patches_every_pending_difference_in_index_order() {
        let mut page = helllo_wrold();

        let outcome = page.apply_all().expect("apply all");

        assert_eq!(outcome.applied, vec![0, 1]);
        assert_eq!(outcome.missed, Vec::<DifferenceIndex>::new());
        assert_eq!(page.editable_text(), "Hello world");
        assert_eq!(page.bulk_mode(), BulkMode::Custom);
    }

    #[test]
    fn test_apply_all_skips_ignored_differences() {
        let mut page = helllo_wrold();
        page.ignore_difference(0).expect("ignore");

        page.apply_all().expect("apply all");

        assert_eq!(page.editable_text(), "Helllo world");
        assert_eq!(page.status(0), Some(DifferenceStatus::Ignored));
    }

    #[test]
    fn test_apply_all_with_nothing_pending_is_a_complete_no_op() {
        let mut page = helllo_wrold();
        page.ignore_all();
        let before = page.clone();

        let outcome = page.apply_all().expect("apply all");

        assert_eq!(outcome, BulkOutcome::default());
        assert_eq!(page, before);
    }

    #[test]
    fn test_ignore_all_resets_the_buffer_regardless_of_prior_decisions() {
        let mut page = helllo_wrold();
        page.apply_difference(0).expect("apply");

        page.ignore_all();

        assert_eq!(page.editable_text(), "Helllo wrold");
        assert_eq!(page.status(0), Some(DifferenceStatus::Ignored));
        assert_eq!(page.status(1), Some(DifferenceStatus::Ignored));
        assert_eq!(page.bulk_mode(), BulkMode::IgnoredAll);
    }

    #[test]
    fn test_replace_all_takes_the_reference_text_and_clears_tracking() {
        let mut page = helllo_wrold();
        page.apply_difference(0).expect("apply");

        page.replace_all();

        assert_eq!(page.editable_text(), "Hello world");
        assert_eq!(page.status(0), Some(DifferenceStatus::Pending));
        assert_eq!(page.bulk_mode(), BulkMode::ReplacedAll);
    }

    #[test]
    fn test_individual_applies_are_suppressed_while_replaced_all_is_active() {
        let mut page = helllo_wrold();
        page.replace_all();

        assert!(matches!(
            page.apply_difference(0),
            Err(CollateError::InvalidTransition(_))
        ));
        assert!(matches!(
            page.apply_all(),
            Err(CollateError::InvalidTransition(_))
        ));
        assert_eq!(page.editable_text(), "Hello world");
    }

    #[test]
    fn test_free_form_edit_demotes_replace_all_to_custom() {
        let mut page = helllo_wrold();
        page.replace_all();

        let edited = format!("{}!", page.editable_text());
        page.set_text(edited.clone());

        assert_eq!(page.editable_text(), edited);
        assert_eq!(page.bulk_mode(), BulkMode::Custom);
    }

    #[test]
    fn test_setting_the_bulk_target_text_keeps_the_bulk_mode() {
        let mut page = helllo_wrold();
        page.replace_all();

        page.set_text("Hello world");

        assert_eq!(page.bulk_mode(), BulkMode::ReplacedAll);
        assert!(page.is_dirty());
    }

    #[test]
    fn test_reset_to_original_from_any_state() {
        let preparations: [fn(&mut PageReconciliation); 4] = [
            |page| {
                page.apply_all().expect("apply all");
            },
            PageReconciliation::ignore_all,
            PageReconciliation::replace_all,
            |page| page.set_text("completely different"),
        ];

        for prepare in preparations {
            let mut page = helllo_wrold();
            prepare(&mut page);

            page.reset_to_original();

            assert_eq!(page.editable_text(), "Helllo wrold");
            assert_eq!(page.bulk_mode(), BulkMode::None);
            assert_eq!(page.status(0), Some(DifferenceStatus::Pending));
            assert_eq!(page.status(1), Some(DifferenceStatus::Pending));
            assert!(!page.is_dirty());
        }
    }

    #[test]
    fn test_equal_differences_are_excluded_from_every_operation() {
        let mut page = PageReconciliation::new(PageComparisonSnapshot {
            original_text: "same old".to_owned(),
            reference_text: "same new".to_owned(),
            differences: vec![
                Difference {
                    index: 0,
                    kind: DifferenceKind::Equal,
                    original_segment: "same".to_owned(),
                    suggested_segment: "same".to_owned(),
                    start_offset: 0,
                    end_offset: 4,
                },
                Difference {
                    index: 1,
                    kind: DifferenceKind::Replace,
                    original_segment: "old".to_owned(),
                    suggested_segment: "new".to_owned(),
                    start_offset: 5,
                    end_offset: 8,
                },
            ],
        });

        assert_eq!(page.status(0), None);
        assert!(matches!(
            page.apply_difference(0),
            Err(CollateError::UnknownDifference(0))
        ));

        let outcome = page.apply_all().expect("apply all");
        assert_eq!(outcome.applied, vec![1]);
        assert_eq!(page.editable_text(), "same new");
    }

    #[test]
    fn test_a_missed_segment_leaves_the_difference_pending() {
        let mut page = helllo_wrold();
        page.set_text("unrelated text");

        let result = page.apply_difference(0);

        assert!(matches!(result, Err(CollateError::PatchMiss(_))));
        assert_eq!(page.status(0), Some(DifferenceStatus::Pending));
        assert_eq!(page.editable_text(), "unrelated text");
    }

    #[test]
    fn test_restore_seeds_statuses_and_text() {
        let mut page = helllo_wrold();

        page.restore("Hello wrold".to_owned(), &[0], &[1]);

        assert_eq!(page.editable_text(), "Hello wrold");
        assert_eq!(page.status(0), Some(DifferenceStatus::Applied));
        assert_eq!(page.status(1), Some(DifferenceStatus::Ignored));
        assert_eq!(page.bulk_mode(), BulkMode::Custom);
        assert!(!page.is_dirty());
    }

    #[test]
    fn test_mark_persisted_only_cleans_an_unchanged_buffer() {
        let mut page = helllo_wrold();
        page.apply_difference(0).expect("apply");

        page.mark_persisted("something else entirely");
        assert!(page.is_dirty());

        page.mark_persisted("Hello wrold");
        assert!(!page.is_dirty());
    }
}
