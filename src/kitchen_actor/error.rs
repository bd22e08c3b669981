//! Error types for talking to the Kitchen actor.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors seen by [`KitchenClient`](crate::clients::KitchenClient) callers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum KitchenError {
    /// The engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The actor is gone or dropped the response.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    /// The actor answered with a result of the wrong shape.
    #[error("Unexpected response from kitchen actor")]
    UnexpectedResponse,
}

impl From<String> for KitchenError {
    fn from(msg: String) -> Self {
        KitchenError::ActorCommunicationError(msg)
    }
}

impl KitchenError {
    /// The engine error behind this failure, if there is one.
    pub fn engine(&self) -> Option<&EngineError> {
        match self {
            KitchenError::Engine(e) => Some(e),
            _ => None,
        }
    }
}
