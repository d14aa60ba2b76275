//! Identifier newtypes shared across crates.

use serde::{Deserialize, Serialize};

/// Declares a numeric identifier newtype.
///
/// Ids are assigned by the store from a monotonically increasing counter,
/// so they wrap an `i64` (the PostgreSQL `BIGSERIAL` type) rather than a UUID.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from its raw value.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Identity of an order. Assigned at creation, never reused.
    OrderId
);

numeric_id!(
    /// Identity of a single status history record.
    StatusUpdateId
);

numeric_id!(
    /// Identity of a user account (client or provider login).
    UserId
);

numeric_id!(
    /// Identity of a provider business, distinct from the user that owns it.
    ProviderId
);

numeric_id!(
    /// Identity of a service offering (wash & fold, dry cleaning, ...).
    ServiceTypeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_preserves_value() {
        let id = OrderId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(OrderId::from(42), id);
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(OrderId::new(1) < OrderId::new(2));
        assert!(StatusUpdateId::new(10) > StatusUpdateId::new(9));
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ProviderId::new(7)).unwrap();
        assert_eq!(json, "7");

        let id: UserId = serde_json::from_str("15").unwrap();
        assert_eq!(id, UserId::new(15));
    }

    #[test]
    fn display_shows_raw_value() {
        assert_eq!(ServiceTypeId::new(3).to_string(), "3");
    }
}
