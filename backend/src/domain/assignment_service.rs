//! Procedure assignment domain service.
//!
//! Implements the driving ports for reconciling and listing the users
//! assigned to a procedure. Validation runs to completion before the store is
//! written, so a rejected request never leaves a partial diff behind.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::ports::{
    AssignUsersRequest, AssignmentRepository, AssignmentRepositoryError,
    ProcedureAssignmentCommand, ProcedureAssignmentQuery,
};
use crate::domain::{
    AssignmentChanges, Error, PlanId, ProcedureId, ProcedureUserAssignment, UserId,
};

/// Service implementing [`ProcedureAssignmentCommand`] and
/// [`ProcedureAssignmentQuery`] over an [`AssignmentRepository`].
#[derive(Clone)]
pub struct ProcedureAssignmentService<R> {
    repo: Arc<R>,
}

impl<R> ProcedureAssignmentService<R> {
    /// Create a new service backed by `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> ProcedureAssignmentService<R>
where
    R: AssignmentRepository,
{
    fn map_repository_error(error: AssignmentRepositoryError) -> Error {
        warn!(error = %error, "assignment repository call failed");
        let message = match &error {
            AssignmentRepositoryError::Connection { .. } => "assignment store unavailable",
            AssignmentRepositoryError::Query { .. } => "assignment store error",
        };
        Error::internal(message).with_details(json!({ "cause": error.to_string() }))
    }

    fn cancelled() -> Error {
        Error::service_unavailable("request cancelled")
    }

    /// Run one store call unless `cancel` fires first.
    async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, AssignmentRepositoryError>> + Send,
    {
        if cancel.is_cancelled() {
            return Err(Self::cancelled());
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Self::cancelled()),
            result = call => result.map_err(Self::map_repository_error),
        }
    }

    fn parse_plan_id(raw: i32) -> Result<PlanId, Error> {
        PlanId::new(raw).map_err(|_| Error::invalid_request("Invalid PlanId"))
    }

    fn parse_procedure_id(raw: i32) -> Result<ProcedureId, Error> {
        ProcedureId::new(raw).map_err(|_| Error::invalid_request("Invalid ProcedureId"))
    }

    /// Resolve every requested user, reporting the first missing one in
    /// request order.
    ///
    /// Non-positive ids cannot exist in the store and are reported as missing
    /// rather than malformed.
    async fn resolve_users(
        &self,
        raw_ids: &[i32],
        cancel: &CancellationToken,
    ) -> Result<Vec<UserId>, Error> {
        if raw_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<UserId> = raw_ids
            .iter()
            .filter_map(|raw| UserId::new(*raw).ok())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let found = if candidates.is_empty() {
            HashSet::new()
        } else {
            Self::guarded(cancel, self.repo.existing_users(&candidates)).await?
        };

        raw_ids
            .iter()
            .map(|raw| {
                UserId::new(*raw)
                    .ok()
                    .filter(|user_id| found.contains(user_id))
                    .ok_or_else(|| Error::not_found(format!("UserId: {raw} not found")))
            })
            .collect()
    }
}

#[async_trait]
impl<R> ProcedureAssignmentCommand for ProcedureAssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn assign_users(
        &self,
        request: AssignUsersRequest,
        cancel: CancellationToken,
    ) -> Result<(), Error> {
        let plan_id = Self::parse_plan_id(request.plan_id)?;
        let procedure_id = Self::parse_procedure_id(request.procedure_id)?;

        if !Self::guarded(&cancel, self.repo.plan_exists(plan_id)).await? {
            return Err(Error::not_found(format!("PlanId: {plan_id} not found")));
        }
        if !Self::guarded(&cancel, self.repo.procedure_exists(procedure_id)).await? {
            return Err(Error::not_found(format!(
                "ProcedureId: {procedure_id} not found"
            )));
        }

        let target = self.resolve_users(&request.user_ids, &cancel).await?;
        let existing =
            Self::guarded(&cancel, self.repo.list_for_procedure(procedure_id)).await?;
        let changes = AssignmentChanges::between(plan_id, procedure_id, &existing, &target);

        if changes.is_empty() {
            debug!(%plan_id, %procedure_id, "assignments already match request");
            return Ok(());
        }

        debug!(
            %plan_id,
            %procedure_id,
            removed = changes.to_remove.len(),
            added = changes.to_add.len(),
            "applying assignment changes"
        );
        Self::guarded(&cancel, self.repo.apply_changes(&changes)).await
    }
}

#[async_trait]
impl<R> ProcedureAssignmentQuery for ProcedureAssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn list_assignments(
        &self,
        procedure_id: i32,
    ) -> Result<Vec<ProcedureUserAssignment>, Error> {
        let procedure_id = Self::parse_procedure_id(procedure_id)?;
        self.repo
            .list_for_procedure(procedure_id)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
