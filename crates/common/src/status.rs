//! Order status enum.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of a laundry order.
///
/// Happy path, in order:
/// ```text
/// Pending ─► Confirmed ─► PickedUp ─► InProgress ─► QualityCheck ─► ReadyForDelivery
///    ─► OutForDelivery ─► Delivered ─► Completed
/// ```
/// `Cancelled` is the failure branch. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the client, not yet accepted.
    #[default]
    Pending,
    Confirmed,
    PickedUp,
    InProgress,
    QualityCheck,
    ReadyForDelivery,
    OutForDelivery,
    Delivered,
    /// Terminal.
    Completed,
    /// Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Every status, happy path first, `Cancelled` last.
    pub const ALL: [OrderStatus; 10] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::PickedUp,
        OrderStatus::InProgress,
        OrderStatus::QualityCheck,
        OrderStatus::ReadyForDelivery,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Returns true if no lifecycle transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns the snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::QualityCheck => "quality_check",
            OrderStatus::ReadyForDelivery => "ready_for_delivery",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a string is not one of the ten status names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid order status: {value}")]
pub struct ParseStatusError {
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError {
                value: s.to_string(),
            })
    }
}
