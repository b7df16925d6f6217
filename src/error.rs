use std::fmt as StdFmt;

/// Errors returned by [`ScapegoatTree`](crate::ScapegoatTree) operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeError {
    /// The balance factor was NaN or outside the open interval (0.5, 1.0).
    InvalidAlpha(f64),

    /// The requested key is not present. The tree is left unmodified.
    KeyNotFound,

    /// The query needs at least one entry.
    EmptyTree,
}

impl StdFmt::Display for TreeError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::InvalidAlpha(alpha) => {
                write!(f, "alpha must lie strictly between 0.5 and 1.0, got {alpha}")
            }

            Self::KeyNotFound => write!(f, "key not found"),

            Self::EmptyTree => write!(f, "tree is empty"),
        }
    }
}

impl std::error::Error for TreeError {}
