use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{OrderStore, sort_history, sort_newest_first};
use crate::{
    INITIAL_STATUS_NOTE, NewOrder, Order, OrderId, OrderQuery, Result, StatusTransition,
    StatusUpdate, StatusUpdateId, StoreError,
};

/// Orders keyed by id, plus the order-number index and id counter.
#[derive(Default)]
struct OrderTable {
    rows: BTreeMap<OrderId, Order>,
    by_number: HashMap<String, OrderId>,
    last_id: i64,
}

impl OrderTable {
    fn next_id(&mut self) -> OrderId {
        self.last_id += 1;
        OrderId::new(self.last_id)
    }
}

/// Append-only status updates, plus their id counter.
#[derive(Default)]
struct HistoryTable {
    rows: Vec<StatusUpdate>,
    last_id: i64,
}

impl HistoryTable {
    fn append(&mut self, order: &Order, notes: Option<String>) -> StatusUpdate {
        self.last_id += 1;
        let update = StatusUpdate {
            id: StatusUpdateId::new(self.last_id),
            order_id: order.id,
            status: order.status,
            notes,
            created_at: order.updated_at,
        };
        self.rows.push(update.clone());
        update
    }

    fn for_order(&self, order_id: OrderId) -> Vec<StatusUpdate> {
        self.rows
            .iter()
            .filter(|u| u.order_id == order_id)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
struct Tables {
    orders: OrderTable,
    history: HistoryTable,
}

/// In-memory order store implementation.
///
/// Both tables sit behind one lock, so every write that touches an order
/// and its history is atomic with respect to other requests.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.rows.len()
    }

    /// Returns the total number of status updates stored.
    pub async fn status_update_count(&self) -> usize {
        self.tables.read().await.history.rows.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, StatusUpdate)> {
        let mut tables = self.tables.write().await;

        if tables.orders.by_number.contains_key(&order.order_number) {
            return Err(StoreError::DuplicateOrderNumber(order.order_number));
        }

        let id = tables.orders.next_id();
        let order = order.into_order(id);
        tables
            .orders
            .by_number
            .insert(order.order_number.clone(), id);
        tables.orders.rows.insert(id, order.clone());

        let update = tables
            .history
            .append(&order, Some(INITIAL_STATUS_NOTE.to_string()));

        Ok((order, update))
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.rows.get(&order_id).cloned())
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<_> = tables
            .orders
            .rows
            .values()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        sort_newest_first(&mut orders);

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(orders.into_iter().skip(offset).take(limit).collect())
    }

    async fn commit_transition(
        &self,
        transition: StatusTransition,
    ) -> Result<(StatusUpdate, Order)> {
        let expected = transition.expected_revision();
        let StatusTransition { order: next, notes } = transition;

        let mut tables = self.tables.write().await;

        let stored = tables
            .orders
            .rows
            .get_mut(&next.id)
            .ok_or(StoreError::OrderNotFound(next.id))?;

        if stored.revision != expected {
            return Err(StoreError::ConcurrencyConflict {
                order_id: next.id,
                expected,
                actual: stored.revision,
            });
        }

        stored.status = next.status;
        stored.updated_at = next.updated_at;
        stored.actual_pickup_time = next.actual_pickup_time;
        stored.actual_delivery_time = next.actual_delivery_time;
        stored.revision = expected.next();
        let order = stored.clone();

        let update = tables.history.append(&order, notes);

        Ok((update, order))
    }

    async fn status_updates(&self, order_id: OrderId) -> Result<Vec<StatusUpdate>> {
        let tables = self.tables.read().await;
        Ok(tables.history.for_order(order_id))
    }

    async fn status_history(&self, order_id: OrderId) -> Result<Vec<StatusUpdate>> {
        let tables = self.tables.read().await;
        let mut updates = tables.history.for_order(order_id);
        sort_history(&mut updates);
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use common::{ProviderId, UserId};

    use super::*;
    use crate::{OrderStatus, OrderStoreExt, Revision};

    fn new_order(client: i64, number: &str) -> NewOrder {
        NewOrder {
            client_id: UserId::new(client),
            provider_id: Some(ProviderId::new(1)),
            service_type_id: None,
            quantity: 3.0,
            total: None,
            tax: None,
            delivery_fee: None,
            scheduled_pickup_time: None,
            scheduled_delivery_time: None,
            notes: None,
            order_number: number.to_string(),
            created_at: Utc::now(),
        }
    }

    fn advanced(order: &Order, status: OrderStatus) -> StatusTransition {
        let mut next = order.clone();
        next.status = status;
        next.updated_at = order.updated_at + Duration::seconds(1);
        StatusTransition::new(next, Some(format!("moved to {status}")))
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_initial_history() {
        let store = InMemoryOrderStore::new();

        let (first, update) = store.insert_order(new_order(1, "WC-AAAAA")).await.unwrap();
        let (second, _) = store.insert_order(new_order(1, "WC-BBBBB")).await.unwrap();

        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
        assert_eq!(first.status, OrderStatus::Pending);
        assert_eq!(update.order_id, first.id);
        assert_eq!(update.status, OrderStatus::Pending);
        assert_eq!(update.notes.as_deref(), Some(INITIAL_STATUS_NOTE));
        assert_eq!(update.created_at, first.created_at);
        assert_eq!(store.order_count().await, 2);
        assert_eq!(store.status_update_count().await, 2);
    }

    #[tokio::test]
    async fn duplicate_order_number_is_rejected() {
        let store = InMemoryOrderStore::new();
        store.insert_order(new_order(1, "WC-SAME1")).await.unwrap();

        let result = store.insert_order(new_order(2, "WC-SAME1")).await;

        assert!(matches!(result, Err(StoreError::DuplicateOrderNumber(n)) if n == "WC-SAME1"));
        assert_eq!(store.order_count().await, 1);
        assert_eq!(store.status_update_count().await, 1);
    }

    #[tokio::test]
    async fn commit_transition_updates_order_and_appends_history() {
        let store = InMemoryOrderStore::new();
        let (order, _) = store.insert_order(new_order(1, "WC-CCCCC")).await.unwrap();

        let (update, updated) = store
            .commit_transition(advanced(&order, OrderStatus::Confirmed))
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.revision, Revision::new(2));
        assert!(updated.updated_at > updated.created_at);
        assert_eq!(update.status, OrderStatus::Confirmed);
        assert_eq!(update.created_at, updated.updated_at);

        let history = store.status_history(order.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], update);
    }

    #[tokio::test]
    async fn commit_transition_only_writes_mutable_columns() {
        let store = InMemoryOrderStore::new();
        let (order, _) = store.insert_order(new_order(1, "WC-DDDDD")).await.unwrap();

        let mut transition = advanced(&order, OrderStatus::Confirmed);
        transition.order.client_id = UserId::new(99);
        transition.order.quantity = 100.0;

        let (_, updated) = store.commit_transition(transition).await.unwrap();

        assert_eq!(updated.client_id, UserId::new(1));
        assert_eq!(updated.quantity, 3.0);
    }

    #[tokio::test]
    async fn stale_revision_is_a_concurrency_conflict() {
        let store = InMemoryOrderStore::new();
        let (order, _) = store.insert_order(new_order(1, "WC-EEEEE")).await.unwrap();

        store
            .commit_transition(advanced(&order, OrderStatus::Confirmed))
            .await
            .unwrap();

        // Built from the same stale snapshot.
        let result = store
            .commit_transition(advanced(&order, OrderStatus::Cancelled))
            .await;

        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyConflict { expected, actual, .. })
                if expected == Revision::first() && actual == Revision::new(2)
        ));

        let current = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::Confirmed);
        assert_eq!(store.status_history(order.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn commit_transition_for_missing_order_fails() {
        let store = InMemoryOrderStore::new();
        let (mut order, _) = store.insert_order(new_order(1, "WC-FFFFF")).await.unwrap();
        order.id = OrderId::new(404);

        let result = store
            .commit_transition(advanced(&order, OrderStatus::Confirmed))
            .await;

        assert!(matches!(result, Err(StoreError::OrderNotFound(id)) if id == OrderId::new(404)));
        assert_eq!(store.status_update_count().await, 1);
    }

    #[tokio::test]
    async fn list_orders_filters_and_sorts_newest_first() {
        let store = InMemoryOrderStore::new();
        let base = Utc::now();

        for (i, client) in [1, 2, 1, 1].into_iter().enumerate() {
            let mut new = new_order(client, &format!("WC-LIST{i}"));
            new.created_at = base + Duration::seconds(i as i64);
            store.insert_order(new).await.unwrap();
        }

        let mine = store
            .list_orders(OrderQuery::for_client(UserId::new(1)))
            .await
            .unwrap();
        let ids: Vec<_> = mine.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![4, 3, 1]);

        let page = store
            .list_orders(OrderQuery::for_client(UserId::new(1)).offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, OrderId::new(3));

        let assigned = store
            .list_orders(OrderQuery::for_provider(ProviderId::new(1)))
            .await
            .unwrap();
        assert_eq!(assigned.len(), 4);

        let none = store
            .list_orders(OrderQuery::new().status(OrderStatus::Delivered))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn history_is_scoped_to_one_order_and_sorted() {
        let store = InMemoryOrderStore::new();
        let (a, _) = store.insert_order(new_order(1, "WC-HISTA")).await.unwrap();
        let (b, _) = store.insert_order(new_order(1, "WC-HISTB")).await.unwrap();

        let (_, a) = store
            .commit_transition(advanced(&a, OrderStatus::Confirmed))
            .await
            .unwrap();
        store
            .commit_transition(advanced(&b, OrderStatus::Cancelled))
            .await
            .unwrap();
        store
            .commit_transition(advanced(&a, OrderStatus::PickedUp))
            .await
            .unwrap();

        let history = store.status_history(a.id).await.unwrap();
        let statuses: Vec<_> = history.iter().map(|u| u.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::PickedUp
            ]
        );
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let unordered = store.status_updates(a.id).await.unwrap();
        assert_eq!(unordered.len(), 3);
    }

    #[tokio::test]
    async fn ext_latest_status_update_tracks_order_status() {
        let store = InMemoryOrderStore::new();
        let (order, _) = store.insert_order(new_order(1, "WC-LATEST")).await.unwrap();
        store
            .commit_transition(advanced(&order, OrderStatus::Confirmed))
            .await
            .unwrap();

        let latest = store.latest_status_update(order.id).await.unwrap().unwrap();
        let current = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(latest.status, current.status);

        assert!(store.order_exists(order.id).await.unwrap());
        assert!(!store.order_exists(OrderId::new(77)).await.unwrap());
        assert!(
            store
                .latest_status_update(OrderId::new(77))
                .await
                .unwrap()
                .is_none()
        );
    }
}
