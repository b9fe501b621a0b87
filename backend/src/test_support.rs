//! Test utilities for the planner crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`);
//! compiled for `cfg(test)` and the `test-support` feature only.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{
    AssignmentChanges, AssignmentId, PlanId, ProcedureId, ProcedureUserAssignment, UserId,
};

/// Clock whose current instant is set by the test.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[derive(Default)]
struct StoreState {
    plans: BTreeSet<PlanId>,
    procedures: BTreeSet<ProcedureId>,
    users: BTreeSet<UserId>,
    rows: Vec<ProcedureUserAssignment>,
    next_id: i32,
    applied_writes: usize,
    failure: Option<AssignmentRepositoryError>,
}

/// In-memory [`AssignmentRepository`] with the same observable behaviour as
/// the Diesel adapter.
///
/// Surrogate ids are allocated from 1 upwards and never reused. A queued
/// failure (see [`Self::fail_next_call`]) is returned by the next repository
/// call instead of touching the store.
///
/// # Examples
/// ```
/// use planner::test_support::InMemoryAssignmentRepository;
///
/// let repo = InMemoryAssignmentRepository::new();
/// repo.add_plan(1);
/// repo.add_procedure(1);
/// repo.add_users([1, 2, 3]);
/// assert!(repo.assignments().is_empty());
/// ```
pub struct InMemoryAssignmentRepository {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryAssignmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAssignmentRepository {
    /// Empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Empty store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_id: 1,
                ..StoreState::default()
            }),
            clock,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory assignment store mutex"),
        }
    }

    fn take_failure(&self) -> Result<(), AssignmentRepositoryError> {
        match self.lock_state().failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn add_plan(&self, raw: i32) {
        let id = PlanId::new(raw).unwrap_or_else(|err| panic!("{err}"));
        self.lock_state().plans.insert(id);
    }

    pub fn add_procedure(&self, raw: i32) {
        let id = ProcedureId::new(raw).unwrap_or_else(|err| panic!("{err}"));
        self.lock_state().procedures.insert(id);
    }

    pub fn add_users(&self, raw_ids: impl IntoIterator<Item = i32>) {
        let mut state = self.lock_state();
        for raw in raw_ids {
            let id = UserId::new(raw).unwrap_or_else(|err| panic!("{err}"));
            state.users.insert(id);
        }
    }

    /// Insert an assignment row directly, bypassing validation.
    pub fn seed_assignment(&self, plan: i32, procedure: i32, user: i32) -> AssignmentId {
        let now = self.clock.utc();
        let mut state = self.lock_state();
        let id = allocate_id(&mut state);
        state.rows.push(ProcedureUserAssignment {
            id,
            plan_id: PlanId::new(plan).unwrap_or_else(|err| panic!("{err}")),
            procedure_id: ProcedureId::new(procedure).unwrap_or_else(|err| panic!("{err}")),
            user_id: UserId::new(user).unwrap_or_else(|err| panic!("{err}")),
            create_date: now,
            update_date: now,
        });
        id
    }

    /// Queue `error` as the result of the next repository call.
    pub fn fail_next_call(&self, error: AssignmentRepositoryError) {
        self.lock_state().failure = Some(error);
    }

    /// Snapshot of every stored row, ordered by surrogate id.
    pub fn assignments(&self) -> Vec<ProcedureUserAssignment> {
        let mut rows = self.lock_state().rows.clone();
        rows.sort_by_key(|row| row.id);
        rows
    }

    /// Number of non-empty change sets applied so far.
    pub fn applied_writes(&self) -> usize {
        self.lock_state().applied_writes
    }
}

fn allocate_id(state: &mut StoreState) -> AssignmentId {
    let id = AssignmentId::new(state.next_id).unwrap_or_else(|err| panic!("{err}"));
    state.next_id += 1;
    id
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn plan_exists(&self, plan_id: PlanId) -> Result<bool, AssignmentRepositoryError> {
        self.take_failure()?;
        Ok(self.lock_state().plans.contains(&plan_id))
    }

    async fn procedure_exists(
        &self,
        procedure_id: ProcedureId,
    ) -> Result<bool, AssignmentRepositoryError> {
        self.take_failure()?;
        Ok(self.lock_state().procedures.contains(&procedure_id))
    }

    async fn existing_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, AssignmentRepositoryError> {
        self.take_failure()?;
        let state = self.lock_state();
        Ok(user_ids
            .iter()
            .copied()
            .filter(|id| state.users.contains(id))
            .collect())
    }

    async fn list_for_procedure(
        &self,
        procedure_id: ProcedureId,
    ) -> Result<Vec<ProcedureUserAssignment>, AssignmentRepositoryError> {
        self.take_failure()?;
        Ok(self
            .assignments()
            .into_iter()
            .filter(|row| row.procedure_id == procedure_id)
            .collect())
    }

    async fn apply_changes(
        &self,
        changes: &AssignmentChanges,
    ) -> Result<(), AssignmentRepositoryError> {
        self.take_failure()?;
        let now = self.clock.utc();
        let mut state = self.lock_state();
        state.rows.retain(|row| !changes.to_remove.contains(&row.id));
        for new_row in &changes.to_add {
            let id = allocate_id(&mut state);
            state.rows.push(ProcedureUserAssignment {
                id,
                plan_id: new_row.plan_id,
                procedure_id: new_row.procedure_id,
                user_id: new_row.user_id,
                create_date: now,
                update_date: now,
            });
        }
        state.applied_writes += 1;
        Ok(())
    }
}
