//! Procedure user assignments and the reconciliation diff.
//!
//! An assignment links one user to one procedure of a plan. Rows are only
//! ever inserted or deleted; [`AssignmentChanges::between`] computes the
//! smallest set of such writes that makes a procedure's rows match a
//! requested user set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssignmentId, PlanId, ProcedureId, UserId};

/// Persisted assignment of a user to a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureUserAssignment {
    /// Surrogate key generated by the store.
    #[serde(rename = "procedureUserAssignmentId")]
    pub id: AssignmentId,
    pub plan_id: PlanId,
    pub procedure_id: ProcedureId,
    pub user_id: UserId,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

/// Assignment row that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewProcedureUserAssignment {
    pub plan_id: PlanId,
    pub procedure_id: ProcedureId,
    pub user_id: UserId,
}

/// Writes required to reconcile a procedure's assignments.
///
/// ## Invariants
/// - `to_remove` only names rows of the reconciled procedure.
/// - `to_add` holds each user at most once, in first-request order, and
///   never a user that already has a row for the procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentChanges {
    pub to_remove: Vec<AssignmentId>,
    pub to_add: Vec<NewProcedureUserAssignment>,
}

impl AssignmentChanges {
    /// Diff the existing rows of `procedure_id` against the target users.
    ///
    /// Existing rows whose user is still wanted are left out of both lists,
    /// so their surrogate ids and timestamps survive. New rows are stamped
    /// with `plan_id`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use planner::domain::{
    ///     AssignmentChanges, AssignmentId, PlanId, ProcedureId, ProcedureUserAssignment, UserId,
    /// };
    ///
    /// let plan = PlanId::new(1).unwrap();
    /// let procedure = ProcedureId::new(1).unwrap();
    /// let existing = vec![ProcedureUserAssignment {
    ///     id: AssignmentId::new(10).unwrap(),
    ///     plan_id: plan,
    ///     procedure_id: procedure,
    ///     user_id: UserId::new(1).unwrap(),
    ///     create_date: Utc::now(),
    ///     update_date: Utc::now(),
    /// }];
    /// let target = [UserId::new(2).unwrap()];
    ///
    /// let changes = AssignmentChanges::between(plan, procedure, &existing, &target);
    /// assert_eq!(changes.to_remove, vec![AssignmentId::new(10).unwrap()]);
    /// assert_eq!(changes.to_add.len(), 1);
    /// ```
    pub fn between(
        plan_id: PlanId,
        procedure_id: ProcedureId,
        existing: &[ProcedureUserAssignment],
        target: &[UserId],
    ) -> Self {
        let wanted: HashSet<UserId> = target.iter().copied().collect();

        let to_remove = existing
            .iter()
            .filter(|row| row.procedure_id == procedure_id && !wanted.contains(&row.user_id))
            .map(|row| row.id)
            .collect();

        let mut seen: HashSet<UserId> = existing
            .iter()
            .filter(|row| row.procedure_id == procedure_id)
            .map(|row| row.user_id)
            .collect();
        let to_add = target
            .iter()
            .copied()
            .filter(|user_id| seen.insert(*user_id))
            .map(|user_id| NewProcedureUserAssignment {
                plan_id,
                procedure_id,
                user_id,
            })
            .collect();

        Self { to_remove, to_add }
    }

    /// True when applying the changes would not touch the store.
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}
