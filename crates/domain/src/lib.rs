//! Domain layer for the laundry order service.
//!
//! This crate provides:
//! - The order lifecycle graph and transition policy
//! - The requester (authorization context) model
//! - Commands for creating orders and changing their status
//! - [`OrderService`], the transition handler over an [`order_store::OrderStore`]

pub mod commands;
pub mod error;
pub mod lifecycle;
pub mod order_number;
pub mod requester;
pub mod service;

pub use commands::{CreateOrder, ListOrders, TransitionStatus};
pub use common::{Money, OrderId, OrderStatus, ProviderId, ServiceTypeId, UserId};
pub use error::DomainError;
pub use lifecycle::{ParsePolicyError, TransitionPolicy};
pub use order_number::{OrderNumberGenerator, RandomOrderNumbers};
pub use order_store::{Order, StatusUpdate};
pub use requester::{ParseRoleError, Requester, Role};
pub use service::{OrderService, TransitionOutcome};
