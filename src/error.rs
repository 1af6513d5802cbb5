use crate::recursion::RecursionTrail;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Unbalanced release of a path segment: expected depth {expected} but the stack is at depth {actual}"
    )]
    UnbalancedRelease { expected: usize, actual: usize },
    #[error(
        "The path stack was modified after this view was taken (view generation {expected}, stack generation {actual})"
    )]
    StaleView { expected: u64, actual: u64 },
    #[error(transparent)]
    InvalidRecursion(#[from] RecursionTrail),
    #[error("Invalid path expression: {0}")]
    InvalidPathExpression(&'static str),
    #[error("Resolving the document produced more than {max_nodes} nodes, last one at {path}")]
    NodeLimitExceeded { max_nodes: usize, path: String },
    #[error("Reference {0} not found")]
    ReferenceNotFound(String),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    /// Records one more enclosing frame on a recursion trail.
    ///
    /// Any other error passes through untouched, so a frame can apply this to
    /// whatever comes out of its children.
    pub fn augment(self, label: impl Into<String>) -> Self {
        match self {
            Error::InvalidRecursion(trail) => Error::InvalidRecursion(trail.augment(label)),
            other => other,
        }
    }

    pub fn is_recursion(&self) -> bool {
        matches!(self, Error::InvalidRecursion(_))
    }

    pub fn as_trail(&self) -> Option<&RecursionTrail> {
        match self {
            Error::InvalidRecursion(trail) => Some(trail),
            _ => None,
        }
    }
}
