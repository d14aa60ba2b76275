use common::ParseStatusError;
use thiserror::Error;

use crate::{OrderId, Revision};

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order exists with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order changed between read and write.
    /// The expected revision did not match the stored revision.
    #[error(
        "Concurrency conflict for order {order_id}: expected revision {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: Revision,
        actual: Revision,
    },

    /// Another order already uses this order number.
    #[error("Duplicate order number: {0}")]
    DuplicateOrderNumber(String),

    /// A stored status column holds an unknown value.
    #[error("Corrupt status column: {0}")]
    CorruptStatus(#[from] ParseStatusError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
