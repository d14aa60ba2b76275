use chrono::{DateTime, Utc};
use common::{Money, ProviderId, ServiceTypeId, UserId};
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, StatusUpdateId};

/// Notes attached to the status update written when an order is created.
pub const INITIAL_STATUS_NOTE: &str = "Order created";

/// Revision number for an order, used for optimistic concurrency control.
///
/// A freshly inserted order is at revision 1; every committed mutation
/// increments it by 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(i64);

impl Revision {
    /// Creates a revision from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the revision of a newly inserted order.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next revision.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw revision value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A laundry order as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_id: UserId,
    pub provider_id: Option<ProviderId>,
    pub service_type_id: Option<ServiceTypeId>,
    pub status: OrderStatus,
    /// Weight or item count, depending on the service unit.
    pub quantity: f64,
    pub total: Option<Money>,
    pub tax: Option<Money>,
    pub delivery_fee: Option<Money>,
    pub scheduled_pickup_time: Option<DateTime<Utc>>,
    pub scheduled_delivery_time: Option<DateTime<Utc>>,
    pub actual_pickup_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub order_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: Revision,
}

/// Everything needed to insert an order. The store assigns the id,
/// sets the status to `pending` and the revision to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub client_id: UserId,
    pub provider_id: Option<ProviderId>,
    pub service_type_id: Option<ServiceTypeId>,
    pub quantity: f64,
    pub total: Option<Money>,
    pub tax: Option<Money>,
    pub delivery_fee: Option<Money>,
    pub scheduled_pickup_time: Option<DateTime<Utc>>,
    pub scheduled_delivery_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub order_number: String,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Builds the stored form of this order once the store has assigned an id.
    pub(crate) fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            client_id: self.client_id,
            provider_id: self.provider_id,
            service_type_id: self.service_type_id,
            status: OrderStatus::Pending,
            quantity: self.quantity,
            total: self.total,
            tax: self.tax,
            delivery_fee: self.delivery_fee,
            scheduled_pickup_time: self.scheduled_pickup_time,
            scheduled_delivery_time: self.scheduled_delivery_time,
            actual_pickup_time: None,
            actual_delivery_time: None,
            notes: self.notes,
            order_number: self.order_number,
            created_at: self.created_at,
            updated_at: self.created_at,
            revision: Revision::first(),
        }
    }
}

/// One immutable entry in an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: StatusUpdateId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A status change ready to be committed.
///
/// `order` carries the new status, the new `updated_at` and any stamped
/// actual pickup/delivery times; its `revision` is the revision the change
/// was computed from. The store writes only those mutable columns, bumps the
/// revision and appends a [`StatusUpdate`] stamped with `order.updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub order: Order,
    pub notes: Option<String>,
}

impl StatusTransition {
    pub fn new(order: Order, notes: Option<String>) -> Self {
        Self { order, notes }
    }

    /// The revision the stored order must still be at.
    pub fn expected_revision(&self) -> Revision {
        self.order.revision
    }
}
