use thiserror::Error;

/// Errors raised by the decision core.
///
/// `InsufficientData` is recovered by the [`Decider`](crate::strategy::Decider)
/// and turned into a non-trading decision; the other kinds reject the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("insufficient data: need at least {required} observations, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of a remote collaborator (rate source, wallet, trade service).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: &'static str,
        reason: String,
    },

    #[error("{collaborator} returned a malformed payload: {reason}")]
    Malformed {
        collaborator: &'static str,
        reason: String,
    },

    /// Configured endpoint is not a valid URL
    #[error("invalid {collaborator} endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        collaborator: &'static str,
        endpoint: String,
        reason: String,
    },
}

impl CollaboratorError {
    pub fn unavailable(collaborator: &'static str, reason: impl ToString) -> Self {
        Self::Unavailable {
            collaborator,
            reason: reason.to_string(),
        }
    }

    pub fn malformed(collaborator: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            collaborator,
            reason: reason.to_string(),
        }
    }
}

/// A decision cycle that could not complete.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Decision(#[from] DecisionError),
}

pub type DecisionResult<T> = std::result::Result<T, DecisionError>;
