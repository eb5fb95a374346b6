//! Difference-reconciliation engine for proofreading an OCR transcription
//! against a reference transcription of the same page.
//!
//! The engine is pure: it owns no I/O and no clocks. It takes a
//! [`PageComparisonSnapshot`] produced by an upstream comparison service and
//! tracks the reviewer's decisions — apply, ignore, revert, or page-wide bulk
//! operations — while keeping the editable text buffer consistent with those
//! decisions regardless of the order they are made in.
//!
//! # Modules
//!
//! - `classify`: similarity scoring and the error-category taxonomy.
//! - `content`: page text as delivered by extraction (plain or block list).
//! - `difference`: the unit of disagreement between the two transcriptions.
//! - `patch`: offset- and content-based application of one difference.
//! - `reconciliation`: the per-page decision state machine.

pub mod classify;
pub mod content;
pub mod difference;
pub mod errors;
pub mod patch;
pub mod reconciliation;
pub mod snapshot;

pub use difference::{Difference, DifferenceIndex, DifferenceKind};
pub use errors::CollateError;
pub use reconciliation::{BulkMode, DifferenceStatus, PageReconciliation};
pub use snapshot::PageComparisonSnapshot;
