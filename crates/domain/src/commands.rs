//! Order commands.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderStatus, ProviderId, ServiceTypeId};
use serde::{Deserialize, Serialize};

/// Command to create a new order for the requesting client.
///
/// Money fields are in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub quantity: f64,

    #[serde(default)]
    pub provider_id: Option<ProviderId>,

    #[serde(default)]
    pub service_type_id: Option<ServiceTypeId>,

    #[serde(default)]
    pub total: Option<Money>,

    #[serde(default)]
    pub tax: Option<Money>,

    #[serde(default)]
    pub delivery_fee: Option<Money>,

    #[serde(default)]
    pub scheduled_pickup_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub scheduled_delivery_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command with only a quantity set.
    pub fn new(quantity: f64) -> Self {
        Self {
            quantity,
            provider_id: None,
            service_type_id: None,
            total: None,
            tax: None,
            delivery_fee: None,
            scheduled_pickup_time: None,
            scheduled_delivery_time: None,
            notes: None,
        }
    }

    /// Assigns the order to a provider.
    pub fn with_provider(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    pub fn with_service_type(mut self, service_type_id: ServiceTypeId) -> Self {
        self.service_type_id = Some(service_type_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the quoted price breakdown.
    pub fn with_pricing(mut self, total: Money, tax: Money, delivery_fee: Money) -> Self {
        self.total = Some(total);
        self.tax = Some(tax);
        self.delivery_fee = Some(delivery_fee);
        self
    }

    /// Sets the requested pickup and delivery times.
    pub fn with_schedule(mut self, pickup: DateTime<Utc>, delivery: DateTime<Utc>) -> Self {
        self.scheduled_pickup_time = Some(pickup);
        self.scheduled_delivery_time = Some(delivery);
        self
    }

    /// Checks quantity and money fields.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(format!(
                "quantity must be a positive number, got {}",
                self.quantity
            ));
        }

        let money = [
            ("total", self.total),
            ("tax", self.tax),
            ("delivery_fee", self.delivery_fee),
        ];
        for (field, amount) in money {
            if let Some(amount) = amount
                && amount.is_negative()
            {
                return Err(format!("{field} must not be negative, got {amount}"));
            }
        }

        Ok(())
    }
}

/// Command to move an order to a new status.
///
/// The target status is kept as received; it is parsed only after the
/// requester has been authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStatus {
    pub order_id: OrderId,
    pub status: String,
    pub notes: Option<String>,
}

impl TransitionStatus {
    pub fn new(order_id: OrderId, status: impl Into<String>) -> Self {
        Self {
            order_id,
            status: status.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Narrows the orders a requester sees when listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOrders {
    pub status: Option<OrderStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_order_is_valid() {
        assert!(CreateOrder::new(2.5).validate().is_ok());
    }

    #[test]
    fn quantity_must_be_positive_and_finite() {
        for quantity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                CreateOrder::new(quantity).validate().is_err(),
                "quantity {quantity} should be rejected"
            );
        }
    }

    #[test]
    fn negative_money_is_rejected() {
        let cmd = CreateOrder::new(1.0).with_pricing(
            Money::from_cents(1000),
            Money::from_cents(-5),
            Money::from_cents(0),
        );
        let err = cmd.validate().unwrap_err();
        assert!(err.contains("tax"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let cmd: CreateOrder =
            serde_json::from_str(r#"{"quantity": 4.0, "provider_id": 7, "total": 2599}"#).unwrap();
        assert_eq!(cmd.quantity, 4.0);
        assert_eq!(cmd.provider_id, Some(ProviderId::new(7)));
        assert_eq!(cmd.total, Some(Money::from_cents(2599)));
        assert!(cmd.notes.is_none());
    }

    #[test]
    fn transition_keeps_raw_status() {
        let cmd = TransitionStatus::new(OrderId::new(1), "shipped").with_notes("late");
        assert_eq!(cmd.status, "shipped");
        assert_eq!(cmd.notes.as_deref(), Some("late"));
    }
}
