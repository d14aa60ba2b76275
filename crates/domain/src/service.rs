//! Order service: authorization, validation and transitions over an order store.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use common::OrderStatus;
use order_store::{
    NewOrder, Order, OrderId, OrderStore, OrderStoreExt, StatusTransition, StatusUpdate,
    StoreError,
};
use serde::Serialize;

use crate::commands::{CreateOrder, ListOrders, TransitionStatus};
use crate::error::DomainError;
use crate::lifecycle::TransitionPolicy;
use crate::order_number::{OrderNumberGenerator, RandomOrderNumbers};
use crate::requester::{Requester, Role};

/// How many order numbers are tried before creation gives up.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// An order together with the status update that brought it to its
/// current status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub status_update: StatusUpdate,
    pub order: Order,
}

/// Service for managing laundry orders.
///
/// Every operation that touches a specific order first checks that it exists
/// and then that the requester may act on it, so a stranger learns nothing
/// beyond whether the id is taken.
pub struct OrderService<S: OrderStore> {
    store: S,
    policy: TransitionPolicy,
    order_numbers: Arc<dyn OrderNumberGenerator>,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service with the strict transition policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: TransitionPolicy::default(),
            order_numbers: Arc::new(RandomOrderNumbers),
        }
    }

    /// Replaces the transition policy.
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the order number generator.
    pub fn with_order_numbers(mut self, generator: impl OrderNumberGenerator + 'static) -> Self {
        self.order_numbers = Arc::new(generator);
        self
    }

    /// Returns a reference to the underlying order store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Creates a new order owned by the requesting client.
    #[tracing::instrument(skip(self), fields(user_id = %requester.user_id))]
    pub async fn create_order(
        &self,
        requester: &Requester,
        cmd: CreateOrder,
    ) -> Result<TransitionOutcome, DomainError> {
        if requester.role != Role::Client {
            return Err(DomainError::Forbidden(
                "only clients can create orders".to_string(),
            ));
        }
        cmd.validate().map_err(DomainError::Validation)?;

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let new_order = NewOrder {
                client_id: requester.user_id,
                provider_id: cmd.provider_id,
                service_type_id: cmd.service_type_id,
                quantity: cmd.quantity,
                total: cmd.total,
                tax: cmd.tax,
                delivery_fee: cmd.delivery_fee,
                scheduled_pickup_time: cmd.scheduled_pickup_time,
                scheduled_delivery_time: cmd.scheduled_delivery_time,
                notes: cmd.notes.clone(),
                order_number: self.order_numbers.generate(),
                created_at: Utc::now(),
            };

            match self.store.insert_order(new_order).await {
                Ok((order, status_update)) => {
                    metrics::counter!("orders_created_total").increment(1);
                    tracing::info!(
                        order_id = %order.id,
                        order_number = %order.order_number,
                        "Order created"
                    );
                    return Ok(TransitionOutcome {
                        status_update,
                        order,
                    });
                }
                Err(StoreError::DuplicateOrderNumber(number)) => {
                    tracing::warn!(%number, attempt, "Order number taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::OrderNumberExhausted(
            MAX_ORDER_NUMBER_ATTEMPTS,
        ))
    }

    /// Loads an order the requester may see.
    #[tracing::instrument(skip(self), fields(user_id = %requester.user_id))]
    pub async fn get_order(
        &self,
        requester: &Requester,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        self.load_authorized(requester, order_id).await
    }

    /// Lists the orders visible to the requester, newest first.
    ///
    /// A provider without a provider profile sees nothing.
    #[tracing::instrument(skip(self), fields(user_id = %requester.user_id))]
    pub async fn list_orders(
        &self,
        requester: &Requester,
        filter: ListOrders,
    ) -> Result<Vec<Order>, DomainError> {
        let Some(mut query) = requester.visible_orders() else {
            return Ok(Vec::new());
        };
        query.status = filter.status;
        query.limit = filter.limit;
        query.offset = filter.offset;

        Ok(self.store.list_orders(query).await?)
    }

    /// Moves an order to a new status and records it in the history.
    ///
    /// Checks run in order: existence, authorization, status validity, then
    /// the lifecycle policy. The order update and the history append commit
    /// together or not at all.
    #[tracing::instrument(
        skip(self, cmd),
        fields(user_id = %requester.user_id, order_id = %cmd.order_id, to = %cmd.status)
    )]
    pub async fn transition_status(
        &self,
        requester: &Requester,
        cmd: TransitionStatus,
    ) -> Result<TransitionOutcome, DomainError> {
        let started = Instant::now();
        let result = self.apply_transition(requester, cmd).await;

        match &result {
            Ok(outcome) => {
                metrics::counter!(
                    "order_transitions_total",
                    "to" => outcome.order.status.as_str()
                )
                .increment(1);
                metrics::histogram!("order_transition_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
            }
            Err(e) => {
                metrics::counter!(
                    "order_transitions_rejected_total",
                    "reason" => rejection_reason(e)
                )
                .increment(1);
            }
        }

        result
    }

    /// Returns the status history of an order, oldest first.
    #[tracing::instrument(skip(self), fields(user_id = %requester.user_id))]
    pub async fn get_history(
        &self,
        requester: &Requester,
        order_id: OrderId,
    ) -> Result<Vec<StatusUpdate>, DomainError> {
        self.load_authorized(requester, order_id).await?;
        Ok(self.store.status_history(order_id).await?)
    }

    /// Checks that an order's latest status update matches its status.
    ///
    /// Returns the latest update on success.
    #[tracing::instrument(skip(self))]
    pub async fn verify_consistency(&self, order_id: OrderId) -> Result<StatusUpdate, DomainError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::NotFound(order_id))?;

        let Some(latest) = self.store.latest_status_update(order_id).await? else {
            return Err(DomainError::Inconsistent {
                order_id,
                reason: "order has no status updates".to_string(),
            });
        };

        if latest.status != order.status {
            return Err(DomainError::Inconsistent {
                order_id,
                reason: format!(
                    "latest status update is {} but order is {}",
                    latest.status, order.status
                ),
            });
        }

        Ok(latest)
    }

    async fn apply_transition(
        &self,
        requester: &Requester,
        cmd: TransitionStatus,
    ) -> Result<TransitionOutcome, DomainError> {
        let order = self.load_authorized(requester, cmd.order_id).await?;
        let target: OrderStatus = cmd.status.parse()?;

        if !self.policy.allows(order.status, target) {
            tracing::warn!(from = %order.status, to = %target, "Transition rejected");
            return Err(DomainError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let from = order.status;
        let next = advance(order, target);

        let (status_update, order) = self
            .store
            .commit_transition(StatusTransition::new(next, cmd.notes))
            .await
            .map_err(|e| match e {
                StoreError::OrderNotFound(id) => DomainError::NotFound(id),
                other => DomainError::Store(other),
            })?;

        tracing::info!(%from, to = %order.status, revision = %order.revision, "Order status changed");

        Ok(TransitionOutcome {
            status_update,
            order,
        })
    }

    async fn load_authorized(
        &self,
        requester: &Requester,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::NotFound(order_id))?;

        if !requester.can_access(&order) {
            tracing::warn!(%order_id, "Requester may not access order");
            return Err(DomainError::Forbidden(format!(
                "order {order_id} does not belong to this {}",
                requester.role
            )));
        }

        Ok(order)
    }
}

/// Computes the order as it will be after moving to `target`.
///
/// `updated_at` never goes backwards, even if the clock does. Entering
/// `picked_up` or `delivered` stamps the matching actual time once.
fn advance(order: Order, target: OrderStatus) -> Order {
    let now = Utc::now().max(order.updated_at);
    let mut next = order;
    next.status = target;
    next.updated_at = now;

    match target {
        OrderStatus::PickedUp if next.actual_pickup_time.is_none() => {
            next.actual_pickup_time = Some(now);
        }
        OrderStatus::Delivered if next.actual_delivery_time.is_none() => {
            next.actual_delivery_time = Some(now);
        }
        _ => {}
    }

    next
}

fn rejection_reason(error: &DomainError) -> &'static str {
    match error {
        DomainError::NotFound(_) => "not_found",
        DomainError::Forbidden(_) => "forbidden",
        DomainError::InvalidStatus(_) => "invalid_status",
        DomainError::InvalidTransition { .. } => "invalid_transition",
        DomainError::Store(StoreError::ConcurrencyConflict { .. }) => "conflict",
        _ => "error",
    }
}
