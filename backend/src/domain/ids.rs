//! Numeric identifiers for persisted entities.
//!
//! Each identifier is a distinct newtype over the database's `BIGINT`
//! primary key so a claim id can never be passed where a technician id is
//! expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Primary key of a user account.
    UserId
);
define_id!(
    /// Primary key of a technician profile (not the technician's user id).
    TechnicianId
);
define_id!(ServiceRequestId);
define_id!(ClaimId);
define_id!(RatingId);
define_id!(CategoryId);
