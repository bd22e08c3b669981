//! Error types for the order engine.

use std::fmt::Display;
use thiserror::Error;

use crate::model::{OrderStatus, StaffId};

/// Errors returned by every engine operation.
///
/// None of these are retried in-process; the reassignment sweeps are the only
/// path that swallows them, and only per order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// An order, staff member, booking, or menu item id did not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A lifecycle guard rejected the requested status change.
    #[error("Invalid transition: cannot move order from {current} to {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The chef is at capacity. The affected orders were queued instead.
    #[error("Staff busy: {staff} has no free capacity")]
    StaffBusy { staff: StaffId },

    /// The acting user does not own, or is not assigned to, the order.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Role mismatch, disabled staff, or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
