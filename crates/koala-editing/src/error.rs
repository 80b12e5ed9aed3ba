use thiserror::Error;

/// Why a search could not be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindError {
    /// Every range contains the empty string; there is nothing to find.
    #[error("search target is empty")]
    EmptyTarget,
}
