//! Integer identifiers for plans, procedures, and users.
//!
//! Store identifiers are positive integers. The newtypes below keep the
//! three kinds apart at compile time and reject non-positive values at
//! construction so downstream code never sees an out-of-range id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation error raised when a raw identifier is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a positive integer, got {value}")]
pub struct IdValidationError {
    kind: &'static str,
    value: i32,
}

impl IdValidationError {
    /// Name of the identifier kind that failed validation.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Raw value that was rejected.
    pub fn value(&self) -> i32 {
        self.value
    }
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i32", into = "i32")]
        pub struct $name(i32);

        impl $name {
            /// Validate and wrap a raw store identifier.
            pub fn new(value: i32) -> Result<Self, IdValidationError> {
                if value < 1 {
                    return Err(IdValidationError { kind: $kind, value });
                }
                Ok(Self(value))
            }

            /// Raw integer value as stored.
            pub fn get(self) -> i32 {
                self.0
            }
        }

        impl TryFrom<i32> for $name {
            type Error = IdValidationError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a plan.
    PlanId,
    "PlanId"
);
define_entity_id!(
    /// Identifier of a procedure within a plan.
    ProcedureId,
    "ProcedureId"
);
define_entity_id!(
    /// Identifier of an assignable user.
    UserId,
    "UserId"
);
define_entity_id!(
    /// Store-generated surrogate key of an assignment row.
    AssignmentId,
    "ProcedureUserAssignmentId"
);
