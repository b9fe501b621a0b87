//! Driving port for reconciling the users assigned to a procedure.
//!
//! Inbound adapters hand raw identifiers to [`ProcedureAssignmentCommand`];
//! validation of those identifiers belongs to the implementation so every
//! adapter reports the same messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::Error;

/// Request to make a procedure's assigned users equal `user_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUsersRequest {
    /// Plan the procedure belongs to. New rows are recorded under it.
    pub plan_id: i32,
    /// Procedure whose assignments are reconciled.
    pub procedure_id: i32,
    /// Target user set. Order and duplicates do not matter; an empty list
    /// unassigns everyone.
    #[serde(default)]
    pub user_ids: Vec<i32>,
}

/// Driving port for procedure user reconciliation.
///
/// # Errors
///
/// Implementations report, in this order of precedence:
/// - `invalid_request` when the plan or procedure id is not positive,
/// - `not_found` when the plan, procedure, or any requested user is missing,
/// - `service_unavailable` when `cancel` fires before the work completes,
/// - `internal_error` when the store fails.
///
/// A failed call leaves the stored assignments untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcedureAssignmentCommand: Send + Sync {
    /// Replace the procedure's assigned users with the requested set.
    async fn assign_users(
        &self,
        request: AssignUsersRequest,
        cancel: CancellationToken,
    ) -> Result<(), Error>;
}

/// Fixture implementation accepting every request without persisting it.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProcedureAssignmentCommand;

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl ProcedureAssignmentCommand for FixtureProcedureAssignmentCommand {
    async fn assign_users(
        &self,
        _request: AssignUsersRequest,
        _cancel: CancellationToken,
    ) -> Result<(), Error> {
        Ok(())
    }
}
