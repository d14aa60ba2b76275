use async_trait::async_trait;

use crate::{NewOrder, Order, OrderId, OrderQuery, Result, StatusTransition, StatusUpdate};

/// Core trait for order storage backends.
///
/// A backend owns two tables: orders (keyed by [`OrderId`]) and the
/// append-only status history. Each backend owns its own id counters.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order together with its initial status update
    /// ([`INITIAL_STATUS_NOTE`](crate::INITIAL_STATUS_NOTE)).
    ///
    /// Both rows are written atomically. Fails with `DuplicateOrderNumber`
    /// if the order number is already taken.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, StatusUpdate)>;

    /// Retrieves an order by id.
    ///
    /// Returns None if the order doesn't exist.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Retrieves orders matching a query, newest first.
    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Commits a status transition.
    ///
    /// The order update and the history append happen atomically - either
    /// both succeed or neither does. Fails with `OrderNotFound` if the order
    /// is gone and with `ConcurrencyConflict` if its revision no longer
    /// matches [`StatusTransition::expected_revision`].
    ///
    /// Returns the appended status update and the updated order.
    async fn commit_transition(&self, transition: StatusTransition)
    -> Result<(StatusUpdate, Order)>;

    /// Retrieves every status update for an order, in no particular order.
    async fn status_updates(&self, order_id: OrderId) -> Result<Vec<StatusUpdate>>;

    /// Retrieves the status history of an order.
    ///
    /// Updates are returned oldest first (creation time, then id).
    async fn status_history(&self, order_id: OrderId) -> Result<Vec<StatusUpdate>>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Checks if an order exists.
    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.get_order(order_id).await?.is_some())
    }

    /// Returns the most recent status update for an order.
    async fn latest_status_update(&self, order_id: OrderId) -> Result<Option<StatusUpdate>> {
        let updates = self.status_updates(order_id).await?;
        Ok(updates
            .into_iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))))
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}

/// Sorts status updates into history order: oldest first, ties broken by id.
pub(crate) fn sort_history(updates: &mut [StatusUpdate]) {
    updates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Sorts orders newest first, ties broken by id.
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
