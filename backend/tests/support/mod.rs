//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Suites opt in with `RUN_PG_EMBEDDED=1` because the embedded cluster
//! downloads server binaries on first use. Each test owns its cluster and
//! a freshly migrated database on it.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use pg_embedded_setup_unpriv::TestCluster;
use planner::outbound::persistence::run_pending_migrations;
use postgres::{Client, NoTls};
use uuid::Uuid;

const BOOTSTRAP_ATTEMPTS: u32 = 3;
const BOOTSTRAP_RETRY_DELAY: Duration = Duration::from_millis(500);

static BOOTSTRAP_LOCK: Mutex<()> = Mutex::new(());

/// Render a `postgres` error with its SQLSTATE and server-side detail.
///
/// `postgres::Error`'s `Display` collapses server errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// True when `RUN_PG_EMBEDDED` is set to a truthy value.
pub fn embedded_postgres_enabled() -> bool {
    std::env::var("RUN_PG_EMBEDDED")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a skipped suite and return `None`.
pub fn skip<T>(reason: impl std::fmt::Display) -> Option<T> {
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

fn pg_embed_dirs() -> std::io::Result<(PathBuf, PathBuf)> {
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"));
    let base = target
        .join("pg-embed")
        .join(format!("planner-{}-{}", std::process::id(), Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

/// Start an embedded cluster, retrying failed bootstraps.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _guard = BOOTSTRAP_LOCK
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    // Keep the cluster inside the build tree unless the caller chose paths.
    let _env = if std::env::var_os("PG_RUNTIME_DIR").is_none()
        || std::env::var_os("PG_DATA_DIR").is_none()
    {
        let (runtime_dir, data_dir) = pg_embed_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    let mut last_error = String::new();
    for attempt in 1..=BOOTSTRAP_ATTEMPTS {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                eprintln!("pg-embed: attempt {attempt}/{BOOTSTRAP_ATTEMPTS} failed: {last_error}");
                std::thread::sleep(BOOTSTRAP_RETRY_DELAY * attempt);
            }
        }
    }
    Err(last_error)
}

/// Create an empty database on `cluster`, migrate it, and return its
/// connection URL.
pub fn fresh_database(cluster: &TestCluster) -> Result<String, String> {
    let name = format!("planner_test_{}", Uuid::new_v4().simple());

    let admin_url = cluster.connection().database_url("postgres");
    let mut admin = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;

    let url = cluster.connection().database_url(&name);
    run_pending_migrations(&url).map_err(|err| err.to_string())?;
    Ok(url)
}

/// Insert plans, procedures, and users with explicit ids.
pub fn seed_reference_rows(
    url: &str,
    plans: &[i32],
    procedures: &[i32],
    users: &[i32],
) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let mut tx = client.transaction().map_err(|err| format_postgres_error(&err))?;
    for id in plans {
        tx.execute("INSERT INTO plans (plan_id) VALUES ($1)", &[id])
            .map_err(|err| format_postgres_error(&err))?;
    }
    for id in procedures {
        let title = format!("Procedure {id}");
        tx.execute(
            "INSERT INTO procedures (procedure_id, procedure_title) VALUES ($1, $2)",
            &[id, &title],
        )
        .map_err(|err| format_postgres_error(&err))?;
    }
    for id in users {
        let name = format!("User {id}");
        tx.execute("INSERT INTO users (user_id, name) VALUES ($1, $2)", &[id, &name])
            .map_err(|err| format_postgres_error(&err))?;
    }
    tx.commit().map_err(|err| format_postgres_error(&err))
}

/// Count assignment rows for `procedure_id` straight from the table.
pub fn count_assignments(url: &str, procedure_id: i32) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "SELECT COUNT(*) FROM procedure_user_assignments WHERE procedure_id = $1",
            &[&procedure_id],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
