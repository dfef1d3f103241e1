//! Strongly-typed ID wrappers for backend resources
//!
//! The backend assigns integer primary keys. Wrapping them keeps a category
//! id from being passed where a transaction id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().trim_start_matches('#').parse()?))
            }
        }
    };
}

define_id!(UserId);
define_id!(TransactionId);
define_id!(CategoryId);
define_id!(CategoryRuleId);
define_id!(BudgetId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: CategoryId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");

        let hashed: TransactionId = "#7".parse().unwrap();
        assert_eq!(hashed, TransactionId::new(7));

        assert!("abc".parse::<BudgetId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id: UserId = serde_json::from_str("15").unwrap();
        assert_eq!(id, UserId::new(15));
        assert_eq!(serde_json::to_string(&id).unwrap(), "15");
    }
}
