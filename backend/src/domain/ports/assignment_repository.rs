//! Driven port for procedure assignment persistence.
//!
//! The [`AssignmentRepository`] trait covers the reads the reconciler needs
//! to validate a request and the single write that applies a computed diff.
//! Adapters must apply [`AssignmentChanges`] atomically: either every removal
//! and insertion lands, or none does.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{AssignmentChanges, PlanId, ProcedureId, ProcedureUserAssignment, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by assignment repository adapters.
    pub enum AssignmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "assignment repository query failed: {message}",
    }
}

/// Port for reading and reconciling procedure user assignments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Whether a plan with `plan_id` exists.
    async fn plan_exists(&self, plan_id: PlanId) -> Result<bool, AssignmentRepositoryError>;

    /// Whether a procedure with `procedure_id` exists.
    async fn procedure_exists(
        &self,
        procedure_id: ProcedureId,
    ) -> Result<bool, AssignmentRepositoryError>;

    /// Subset of `user_ids` that exist in the store.
    async fn existing_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, AssignmentRepositoryError>;

    /// All assignment rows of a procedure, ordered by surrogate id.
    ///
    /// Rows are matched on the procedure alone, whatever plan they were
    /// recorded under.
    async fn list_for_procedure(
        &self,
        procedure_id: ProcedureId,
    ) -> Result<Vec<ProcedureUserAssignment>, AssignmentRepositoryError>;

    /// Apply removals and insertions in one transaction.
    ///
    /// Inserted rows take their creation and update timestamps from the
    /// adapter's clock.
    async fn apply_changes(
        &self,
        changes: &AssignmentChanges,
    ) -> Result<(), AssignmentRepositoryError>;
}
