//! Integration tests for `DieselAssignmentRepository` against embedded PostgreSQL.
//!
//! Opt in with `RUN_PG_EMBEDDED=1 cargo test -- --ignored`. Each test starts
//! its own cluster and drives the async repository from a dedicated Tokio
//! runtime so steps stay synchronous.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use planner::domain::ports::{
    AssignUsersRequest, AssignmentRepository, AssignmentRepositoryError,
    ProcedureAssignmentCommand, ProcedureAssignmentQuery,
};
use planner::domain::{
    AssignmentChanges, ErrorCode, NewProcedureUserAssignment, PlanId, ProcedureAssignmentService,
    ProcedureId, UserId,
};
use planner::outbound::persistence::{DbPool, DieselAssignmentRepository, PoolConfig};
use planner::test_support::MutableClock;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

mod support;

use support::{count_assignments, embedded_postgres_enabled, fresh_database, seed_reference_rows};

struct TestContext {
    runtime: Runtime,
    repository: Arc<DieselAssignmentRepository>,
    database_url: String,
    _cluster: TestCluster,
}

impl TestContext {
    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = support::test_cluster()?;
    let database_url = fresh_database(&cluster)?;
    seed_reference_rows(&database_url, &[1, 2], &[1, 2], &[1, 2, 3, 4])?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    let start = Utc
        .with_ymd_and_hms(2023, 11, 23, 13, 33, 53)
        .single()
        .ok_or("invalid fixture timestamp")?;
    let repository = Arc::new(DieselAssignmentRepository::new(
        pool,
        Arc::new(MutableClock::new(start)),
    ));

    Ok(TestContext {
        runtime,
        repository,
        database_url,
        _cluster: cluster,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    if !embedded_postgres_enabled() {
        return support::skip("set RUN_PG_EMBEDDED=1 to run");
    }
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => panic!("test cluster setup failed: {reason}"),
    }
}

fn plan(raw: i32) -> PlanId {
    PlanId::new(raw).expect("valid plan id")
}

fn procedure(raw: i32) -> ProcedureId {
    ProcedureId::new(raw).expect("valid procedure id")
}

fn user(raw: i32) -> UserId {
    UserId::new(raw).expect("valid user id")
}

fn additions(plan_id: i32, procedure_id: i32, user_ids: &[i32]) -> AssignmentChanges {
    AssignmentChanges {
        to_remove: Vec::new(),
        to_add: user_ids
            .iter()
            .map(|raw| NewProcedureUserAssignment {
                plan_id: plan(plan_id),
                procedure_id: procedure(procedure_id),
                user_id: user(*raw),
            })
            .collect(),
    }
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn existence_checks_reflect_seeded_rows(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let repo = ctx.repository.clone();

    let (plan_found, plan_missing, procedure_found, procedure_missing, users) =
        ctx.block_on(async move {
            (
                repo.plan_exists(plan(1)).await.expect("plan lookup"),
                repo.plan_exists(plan(99)).await.expect("plan lookup"),
                repo.procedure_exists(procedure(2)).await.expect("procedure lookup"),
                repo.procedure_exists(procedure(99)).await.expect("procedure lookup"),
                repo.existing_users(&[user(1), user(4), user(7)])
                    .await
                    .expect("user lookup"),
            )
        });

    assert!(plan_found);
    assert!(!plan_missing);
    assert!(procedure_found);
    assert!(!procedure_missing);
    assert_eq!(users, HashSet::from([user(1), user(4)]));
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn applied_rows_are_listed_in_insertion_order(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let repo = ctx.repository.clone();

    let rows = ctx.block_on(async move {
        repo.apply_changes(&additions(1, 1, &[3, 1, 2]))
            .await
            .expect("apply additions");
        repo.apply_changes(&additions(1, 2, &[4]))
            .await
            .expect("apply additions");
        repo.list_for_procedure(procedure(1))
            .await
            .expect("list assignments")
    });

    let listed: Vec<i32> = rows.iter().map(|row| row.user_id.get()).collect();
    assert_eq!(listed, vec![3, 1, 2]);
    assert!(rows.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(rows.iter().all(|row| row.plan_id == plan(1)));
    let stamp = Utc
        .with_ymd_and_hms(2023, 11, 23, 13, 33, 53)
        .single()
        .expect("valid fixture timestamp");
    assert!(rows.iter().all(|row| row.create_date == stamp && row.update_date == stamp));
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn failed_insert_rolls_back_removals(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let repo = ctx.repository.clone();

    let (result, remaining) = ctx.block_on(async move {
        repo.apply_changes(&additions(1, 1, &[1, 2]))
            .await
            .expect("seed assignments");
        let existing = repo
            .list_for_procedure(procedure(1))
            .await
            .expect("list assignments");

        // User 99 has no row, so the insert violates the foreign key.
        let mut changes = additions(1, 1, &[99]);
        changes.to_remove = existing.iter().map(|row| row.id).collect();
        let result = repo.apply_changes(&changes).await;
        let remaining = repo
            .list_for_procedure(procedure(1))
            .await
            .expect("list assignments");
        (result, remaining)
    });

    assert!(matches!(result, Err(AssignmentRepositoryError::Query { .. })));
    let users: Vec<i32> = remaining.iter().map(|row| row.user_id.get()).collect();
    assert_eq!(users, vec![1, 2]);
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn service_reconciles_through_postgres(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let service = ProcedureAssignmentService::new(ctx.repository.clone());
    let request = |user_ids: Vec<i32>| AssignUsersRequest {
        plan_id: 1,
        procedure_id: 1,
        user_ids,
    };

    let (first, second) = ctx.block_on(async {
        service
            .assign_users(request(vec![1, 2, 3]), CancellationToken::new())
            .await
            .expect("first assignment");
        let first = service.list_assignments(1).await.expect("list assignments");

        service
            .assign_users(request(vec![2, 3, 4]), CancellationToken::new())
            .await
            .expect("second assignment");
        let second = service.list_assignments(1).await.expect("list assignments");
        (first, second)
    });

    let kept: Vec<_> = first.iter().filter(|row| row.user_id != user(1)).cloned().collect();
    assert_eq!(&second[..2], kept.as_slice());
    assert_eq!(second[2].user_id, user(4));
    assert_eq!(
        count_assignments(&ctx.database_url, 1).expect("count assignments"),
        3
    );

    let missing = ctx.block_on(async {
        service
            .assign_users(request(vec![1, 42]), CancellationToken::new())
            .await
    });
    let err = missing.expect_err("unknown user is rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "UserId: 42 not found");
    assert_eq!(
        count_assignments(&ctx.database_url, 1).expect("count assignments"),
        3
    );
}
