//! Shared identifiers and value types for the laundry order service.
//!
//! Everything here is plain data used by both the storage layer and the
//! domain layer: numeric id newtypes, the order status enum and money.

pub mod money;
pub mod status;
pub mod types;

pub use money::Money;
pub use status::{OrderStatus, ParseStatusError};
pub use types::{OrderId, ProviderId, ServiceTypeId, StatusUpdateId, UserId};
