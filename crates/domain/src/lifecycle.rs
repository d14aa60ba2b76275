//! Order lifecycle graph.
//!
//! ```text
//! Pending ─► Confirmed ─► PickedUp ─► InProgress ─► QualityCheck ─► ReadyForDelivery
//!   ─► OutForDelivery ─► Delivered ─► Completed
//!
//! any non-terminal status ─► Cancelled
//! ```

use std::str::FromStr;

use common::OrderStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returns the statuses an order may move to from `status`.
///
/// Each non-terminal status has its next happy-path status plus `Cancelled`.
/// Terminal statuses have no successors.
pub fn successors(status: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;

    match status {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[PickedUp, Cancelled],
        PickedUp => &[InProgress, Cancelled],
        InProgress => &[QualityCheck, Cancelled],
        QualityCheck => &[ReadyForDelivery, Cancelled],
        ReadyForDelivery => &[OutForDelivery, Cancelled],
        OutForDelivery => &[Delivered, Cancelled],
        Delivered => &[Completed, Cancelled],
        Completed | Cancelled => &[],
    }
}

/// Returns true if `to` is a successor of `from` in the lifecycle graph.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    successors(from).contains(&to)
}

/// How strictly transitions are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Only edges of the lifecycle graph are allowed.
    #[default]
    Strict,

    /// Any status may follow any other; only enum membership is checked.
    Permissive,
}

impl TransitionPolicy {
    /// Returns true if the policy allows moving from `from` to `to`.
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Strict => can_transition(from, to),
            TransitionPolicy::Permissive => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Strict => "strict",
            TransitionPolicy::Permissive => "permissive",
        }
    }
}

impl std::fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition policy: {value} (expected strict or permissive)")]
pub struct ParsePolicyError {
    pub value: String,
}

impl FromStr for TransitionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            _ => Err(ParsePolicyError {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAPPY_PATH: [OrderStatus; 9] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::PickedUp,
        OrderStatus::InProgress,
        OrderStatus::QualityCheck,
        OrderStatus::ReadyForDelivery,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ];

    #[test]
    fn happy_path_is_walkable() {
        for pair in HAPPY_PATH.windows(2) {
            assert!(
                can_transition(pair[0], pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn cancel_from_every_non_terminal_status() {
        for status in OrderStatus::ALL {
            assert_eq!(
                can_transition(status, OrderStatus::Cancelled),
                !status.is_terminal(),
                "cancel from {status}"
            );
        }
    }

    #[test]
    fn terminal_statuses_have_no_successors() {
        assert!(successors(OrderStatus::Completed).is_empty());
        assert!(successors(OrderStatus::Cancelled).is_empty());
    }

    #[test]
    fn no_skipping_backtracking_or_self_loops() {
        assert!(!can_transition(OrderStatus::Pending, OrderStatus::Completed));
        assert!(!can_transition(OrderStatus::Pending, OrderStatus::PickedUp));
        assert!(!can_transition(OrderStatus::Delivered, OrderStatus::InProgress));
        for status in OrderStatus::ALL {
            assert!(!can_transition(status, status));
        }
    }

    #[test]
    fn every_non_terminal_status_has_exactly_two_successors() {
        for status in OrderStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert_eq!(successors(status).len(), 2, "{status}");
        }
    }

    #[test]
    fn permissive_policy_allows_anything() {
        let policy = TransitionPolicy::Permissive;
        assert!(policy.allows(OrderStatus::Pending, OrderStatus::Completed));
        assert!(policy.allows(OrderStatus::Cancelled, OrderStatus::Pending));
        assert!(policy.allows(OrderStatus::Confirmed, OrderStatus::Confirmed));
    }

    #[test]
    fn strict_policy_is_the_default() {
        let policy = TransitionPolicy::default();
        assert_eq!(policy, TransitionPolicy::Strict);
        assert!(!policy.allows(OrderStatus::Pending, OrderStatus::Completed));
        assert!(policy.allows(OrderStatus::Pending, OrderStatus::Confirmed));
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("strict".parse(), Ok(TransitionPolicy::Strict));
        assert_eq!("PERMISSIVE".parse(), Ok(TransitionPolicy::Permissive));
        assert!("lenient".parse::<TransitionPolicy>().is_err());
    }
}
