//! Domain error types.

use common::{OrderId, OrderStatus, ParseStatusError};
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No order exists with this id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The requester may not act on this order.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The target status is not one of the lifecycle statuses.
    #[error(transparent)]
    InvalidStatus(#[from] ParseStatusError),

    /// The target status is not a successor of the current status.
    #[error("Invalid status transition: cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Order fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Order and history disagree.
    #[error("Order {order_id} is inconsistent: {reason}")]
    Inconsistent { order_id: OrderId, reason: String },

    /// Every generated order number was already taken.
    #[error("Could not allocate a unique order number after {0} attempts")]
    OrderNumberExhausted(usize),

    /// An error occurred in the order store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
