//! Storage for laundry orders and their status history.
//!
//! [`OrderStore`] is the injectable storage interface. Two backends are
//! provided: [`InMemoryOrderStore`] for tests and single-node deployments,
//! and [`PostgresOrderStore`] for durable storage.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{OrderId, OrderStatus, StatusUpdateId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use query::OrderQuery;
pub use record::{INITIAL_STATUS_NOTE, NewOrder, Order, Revision, StatusTransition, StatusUpdate};
pub use store::{OrderStore, OrderStoreExt};
