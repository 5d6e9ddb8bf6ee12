//! Strongly-typed identifiers used across the domain.
//!
//! Records are keyed by store-assigned integer ids (database `BIGINT` / serial
//! columns). Each record kind wraps the integer in its own newtype so an item id
//! can never be passed where an owner id is expected.

use serde::{Deserialize, Serialize};

/// Identifier of an owner (the customer whose inventory is in scope).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

/// Implement the common id surface for an `i64` newtype.
///
/// The newtype must be a tuple struct with a single `i64` field. Domain crates
/// use this for their own record ids.
#[macro_export]
macro_rules! impl_record_id {
    ($t:ident, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_record_id!(OwnerId, "OwnerId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let id: OwnerId = " 7 ".parse().unwrap();
        assert_eq!(id, OwnerId::new(7));
        assert_eq!(id.to_string(), "7");
        assert_eq!(i64::from(id), 7);
    }

    #[test]
    fn rejects_non_numeric() {
        let err = "seven".parse::<OwnerId>().unwrap_err();
        assert!(matches!(err, crate::DomainError::InvalidId(_)));
    }
}
