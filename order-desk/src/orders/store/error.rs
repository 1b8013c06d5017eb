use super::super::storage::StorageError;
use shared::order::OrderStatus;
use thiserror::Error;

/// Store errors
///
/// Everything except [`StoreError::Storage`] is raised before any state is
/// touched. A storage error from a mutating call means the in-memory change
/// was applied but may not survive a restart.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {item_id} (order {order_id})")]
    ItemNotFound { order_id: String, item_id: String },

    #[error("Order already completed: {0}")]
    OrderAlreadyCompleted(String),

    #[error("Order already cancelled: {0}")]
    OrderAlreadyCancelled(String),

    #[error("Invalid status transition for {order_id}: {from} -> {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Coarse classification for callers that only need to pick a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, nothing applied
    Validation,
    /// Unknown order or item, nothing applied
    NotFound,
    /// Order is in a terminal state, nothing applied
    Conflict,
    /// Durable write or read failed
    Persistence,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Storage(_) => ErrorKind::Persistence,
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::OrderNotFound(_) | StoreError::ItemNotFound { .. } => ErrorKind::NotFound,
            StoreError::OrderAlreadyCompleted(_)
            | StoreError::OrderAlreadyCancelled(_)
            | StoreError::InvalidTransition { .. } => ErrorKind::Conflict,
        }
    }

    /// Terminal-state guard error for an order in `status`
    pub(crate) fn terminal(order_id: &str, status: OrderStatus) -> Self {
        match status {
            OrderStatus::Cancelled => StoreError::OrderAlreadyCancelled(order_id.to_string()),
            _ => StoreError::OrderAlreadyCompleted(order_id.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
