#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of a difference within one page's difference set. Assigned once
/// by the upstream comparison service; never reused or reordered within a
/// session.
pub type DifferenceIndex = u32;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// One unit of disagreement between the OCR transcription and the reference
/// transcription of a page.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub index: DifferenceIndex,
    pub kind: DifferenceKind,
    pub original_segment: String,
    pub suggested_segment: String,

    /// Half-open character (not byte) range into the pristine original text.
    /// Only valid against the untouched original: applying any other
    /// difference shifts the live buffer away from these offsets.
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Difference {
    /// `Equal` segments are display-only; they take part in no
    /// reconciliation operation.
    #[must_use]
    pub const fn is_reconcilable(&self) -> bool { !matches!(self.kind, DifferenceKind::Equal) }
}
