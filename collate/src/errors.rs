use thiserror::Error;

use crate::difference::DifferenceIndex;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollateError {
    /// The segment a patch operation needs to find is absent from the current
    /// text. The operation is a no-op; reconciliation continues.
    #[error("Cannot find `{0}` in the current text")]
    PatchMiss(String),

    /// The requested operation is not valid from the difference's (or the
    /// page's) current status. No state is changed.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Difference {0} is not part of this page's reconcilable set")]
    UnknownDifference(DifferenceIndex),
}
