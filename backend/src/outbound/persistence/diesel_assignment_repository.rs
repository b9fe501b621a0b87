//! PostgreSQL-backed `AssignmentRepository` implementation using Diesel ORM.
//!
//! Existence checks and listings run as single statements. A change set is
//! applied inside one transaction: a single `DELETE ... WHERE id = ANY(..)`
//! followed by one multi-row `INSERT`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{
    AssignmentChanges, AssignmentId, PlanId, ProcedureId, ProcedureUserAssignment, UserId,
};

use super::models::{AssignmentRow, NewAssignmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{plans, procedure_user_assignments, procedures, users};

/// Diesel-backed implementation of the `AssignmentRepository` port.
///
/// Inserted rows are stamped with the injected clock rather than the
/// database default so tests can pin timestamps.
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselAssignmentRepository {
    /// Create a new repository with the given connection pool and clock.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> AssignmentRepositoryError {
    AssignmentRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> AssignmentRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AssignmentRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            AssignmentRepositoryError::query("assignment references a missing row")
        }
        DieselError::RollbackTransaction | DieselError::RollbackErrorOnCommit { .. } => {
            AssignmentRepositoryError::query("assignment transaction rolled back")
        }
        DieselError::QueryBuilderError(_) => AssignmentRepositoryError::query("database query error"),
        _ => AssignmentRepositoryError::query("database error"),
    }
}

/// Convert a stored row, rejecting ids the schema should never produce.
fn row_to_assignment(row: AssignmentRow) -> Result<ProcedureUserAssignment, AssignmentRepositoryError> {
    let corrupt = |err: crate::domain::IdValidationError| {
        AssignmentRepositoryError::query(format!("corrupt assignment row: {err}"))
    };
    Ok(ProcedureUserAssignment {
        id: AssignmentId::new(row.procedure_user_assignment_id).map_err(corrupt)?,
        plan_id: PlanId::new(row.plan_id).map_err(corrupt)?,
        procedure_id: ProcedureId::new(row.procedure_id).map_err(corrupt)?,
        user_id: UserId::new(row.user_id).map_err(corrupt)?,
        create_date: row.create_date,
        update_date: row.update_date,
    })
}

fn new_rows(changes: &AssignmentChanges, clock: &dyn Clock) -> Vec<NewAssignmentRow> {
    let now = clock.utc();
    changes
        .to_add
        .iter()
        .map(|row| NewAssignmentRow {
            plan_id: row.plan_id.get(),
            procedure_id: row.procedure_id.get(),
            user_id: row.user_id.get(),
            create_date: now,
            update_date: now,
        })
        .collect()
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn plan_exists(&self, plan_id: PlanId) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            plans::table.filter(plans::plan_id.eq(plan_id.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn procedure_exists(
        &self,
        procedure_id: ProcedureId,
    ) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            procedures::table.filter(procedures::procedure_id.eq(procedure_id.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn existing_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, AssignmentRepositoryError> {
        if user_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i32> = user_ids.iter().map(|id| id.get()).collect();

        let found: Vec<i32> = users::table
            .filter(users::user_id.eq_any(raw))
            .select(users::user_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        found
            .into_iter()
            .map(|raw| {
                UserId::new(raw).map_err(|err| {
                    AssignmentRepositoryError::query(format!("corrupt user row: {err}"))
                })
            })
            .collect()
    }

    async fn list_for_procedure(
        &self,
        procedure_id: ProcedureId,
    ) -> Result<Vec<ProcedureUserAssignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AssignmentRow> = procedure_user_assignments::table
            .filter(procedure_user_assignments::procedure_id.eq(procedure_id.get()))
            .order_by(procedure_user_assignments::procedure_user_assignment_id)
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_assignment).collect()
    }

    async fn apply_changes(
        &self,
        changes: &AssignmentChanges,
    ) -> Result<(), AssignmentRepositoryError> {
        if changes.is_empty() {
            return Ok(());
        }
        let stale: Vec<i32> = changes.to_remove.iter().map(|id| id.get()).collect();
        let inserts = new_rows(changes, self.clock.as_ref());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                if !stale.is_empty() {
                    diesel::delete(
                        procedure_user_assignments::table.filter(
                            procedure_user_assignments::procedure_user_assignment_id
                                .eq_any(stale),
                        ),
                    )
                    .execute(conn)
                    .await?;
                }
                if !inserts.is_empty() {
                    diesel::insert_into(procedure_user_assignments::table)
                        .values(&inserts)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
