//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel rows and domain
//! types and contain no business logic. Row structs (`models.rs`) and the
//! table definitions (`schema.rs`) stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mockable::DefaultClock;
//! use planner::outbound::persistence::{DbPool, DieselAssignmentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/planner")).await?;
//! let repo = DieselAssignmentRepository::new(pool, Arc::new(DefaultClock));
//! ```

mod diesel_assignment_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
