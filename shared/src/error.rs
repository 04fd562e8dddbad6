use crate::{rejection_message, Outcome, Transition};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("batch could not be parsed")]
    MalformedBatch,

    #[error("batch must not be empty")]
    EmptyBatch,

    #[error("product could not be added")]
    MalformedProduct,

    /// The batch was well formed but changed nothing.
    #[error("{}", rejection_message(*transition, *outcome))]
    Rejected {
        transition: Transition,
        outcome: Outcome,
    },

    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Store(_))
    }

    /// Message safe to hand back to a caller. Store failures never echo their cause.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Store(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Full text for logs, including every context layer of a store failure.
    pub fn detail(&self) -> String {
        match self {
            ServiceError::Store(e) => format!("store failure: {e:#}"),
            other => other.to_string(),
        }
    }
}
