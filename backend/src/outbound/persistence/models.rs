//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::procedure_user_assignments;

/// Row struct for reading from the procedure_user_assignments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = procedure_user_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub procedure_user_assignment_id: i32,
    pub plan_id: i32,
    pub procedure_id: i32,
    pub user_id: i32,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

/// Insertable struct for new assignment rows.
///
/// The surrogate key is left to the `SERIAL` default.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = procedure_user_assignments)]
pub(crate) struct NewAssignmentRow {
    pub plan_id: i32,
    pub procedure_id: i32,
    pub user_id: i32,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}
