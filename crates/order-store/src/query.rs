use common::{ProviderId, UserId};

use crate::{Order, OrderStatus};

/// Builder for listing orders by key.
///
/// Results are always returned newest first (by creation time, then id).
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Filter by owning client.
    pub client_id: Option<UserId>,

    /// Filter by assigned provider.
    pub provider_id: Option<ProviderId>,

    /// Filter by current status.
    pub status: Option<OrderStatus>,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,

    /// Number of orders to skip.
    pub offset: Option<usize>,
}

impl OrderQuery {
    /// Creates a new empty query matching every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one client's orders.
    pub fn for_client(client_id: UserId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Default::default()
        }
    }

    /// Creates a query for orders assigned to one provider.
    pub fn for_provider(provider_id: ProviderId) -> Self {
        Self {
            provider_id: Some(provider_id),
            ..Default::default()
        }
    }

    /// Filters by current status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Limits the number of orders returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many orders before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the order passes every filter set on this query.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(client_id) = self.client_id
            && order.client_id != client_id
        {
            return false;
        }
        if let Some(provider_id) = self.provider_id
            && order.provider_id != Some(provider_id)
        {
            return false;
        }
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_for_client() {
        let query = OrderQuery::for_client(UserId::new(3));

        assert_eq!(query.client_id, Some(UserId::new(3)));
        assert!(query.provider_id.is_none());
    }

    #[test]
    fn query_for_provider() {
        let query = OrderQuery::for_provider(ProviderId::new(8));

        assert!(query.client_id.is_none());
        assert_eq!(query.provider_id, Some(ProviderId::new(8)));
    }

    #[test]
    fn query_builder_chain() {
        let query = OrderQuery::for_client(UserId::new(1))
            .status(OrderStatus::Delivered)
            .limit(5)
            .offset(10);

        assert_eq!(query.client_id, Some(UserId::new(1)));
        assert_eq!(query.status, Some(OrderStatus::Delivered));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.offset, Some(10));
    }
}
