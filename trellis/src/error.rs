//! Layout error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid sizing: {0}")]
    InvalidSizing(String),

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    /// The node only answers the unbounded intrinsic-size query.
    #[error("bounded measurement not supported")]
    UnboundedOnly,

    #[error("widget failure: {0}")]
    Widget(String),
}

impl LayoutError {
    /// Configuration errors raised by the caller; these are never contained.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            LayoutError::InvalidSizing(_)
                | LayoutError::InvalidPlacement(_)
                | LayoutError::InvalidPadding(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
