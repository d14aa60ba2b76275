//! The identity on whose behalf an operation runs.

use std::str::FromStr;

use common::{ProviderId, UserId};
use order_store::{Order, OrderQuery};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of account making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Provider => "provider",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid role: {value} (expected client or provider)")]
pub struct ParseRoleError {
    pub value: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "provider" => Ok(Role::Provider),
            _ => Err(ParseRoleError {
                value: s.to_string(),
            }),
        }
    }
}

/// Authorization context for an order operation.
///
/// Supplied by the caller and trusted as-is; credentials are verified
/// upstream. A provider requester carries the id of the provider business
/// it acts for, which may be missing if the account has no provider profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: UserId,
    pub role: Role,
    pub provider_id: Option<ProviderId>,
}

impl Requester {
    /// A client acting on their own orders.
    pub fn client(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Client,
            provider_id: None,
        }
    }

    /// A provider account, acting for `provider_id` when it has one.
    pub fn provider(user_id: UserId, provider_id: Option<ProviderId>) -> Self {
        Self {
            user_id,
            role: Role::Provider,
            provider_id,
        }
    }

    /// Returns true if this requester owns the order (client) or is
    /// assigned to it (provider).
    pub fn can_access(&self, order: &Order) -> bool {
        match self.role {
            Role::Client => order.client_id == self.user_id,
            Role::Provider => self.provider_id.is_some() && order.provider_id == self.provider_id,
        }
    }

    /// Returns the query selecting the orders this requester can see,
    /// or None if it can see none.
    pub fn visible_orders(&self) -> Option<OrderQuery> {
        match self.role {
            Role::Client => Some(OrderQuery::for_client(self.user_id)),
            Role::Provider => self.provider_id.map(OrderQuery::for_provider),
        }
    }
}
