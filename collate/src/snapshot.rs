#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::difference::{Difference, DifferenceIndex};

/// The immutable input bundle for one page: both transcriptions and the
/// positional differences between them, as produced by the upstream
/// comparison service. Document and page identity travel next to the
/// snapshot, not inside it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageComparisonSnapshot {
    pub original_text: String,
    pub reference_text: String,
    pub differences: Vec<Difference>,
}

impl PageComparisonSnapshot {
    #[must_use]
    pub fn difference(&self, index: DifferenceIndex) -> Option<&Difference> {
        self.differences
            .iter()
            .find(|difference| difference.index == index)
    }

    /// The differences a reviewer can act on, in ascending index order.
    pub fn reconcilable_differences(&self) -> impl Iterator<Item = &Difference> {
        self.differences
            .iter()
            .filter(|difference| difference.is_reconcilable())
    }
}
