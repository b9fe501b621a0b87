//! Diesel table definitions for the planning schema.
//!
//! These definitions must match `migrations/` exactly; regenerate them with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Plans grouping procedures.
    plans (plan_id) {
        plan_id -> Int4,
        create_date -> Timestamptz,
        update_date -> Timestamptz,
    }
}

diesel::table! {
    /// Procedures users can be assigned to.
    procedures (procedure_id) {
        procedure_id -> Int4,
        procedure_title -> Varchar,
        create_date -> Timestamptz,
        update_date -> Timestamptz,
    }
}

diesel::table! {
    /// Assignable users.
    users (user_id) {
        user_id -> Int4,
        name -> Varchar,
        create_date -> Timestamptz,
        update_date -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (procedure, user) assignment.
    ///
    /// Rows are inserted and deleted by reconciliation but never updated.
    procedure_user_assignments (procedure_user_assignment_id) {
        procedure_user_assignment_id -> Int4,
        plan_id -> Int4,
        procedure_id -> Int4,
        user_id -> Int4,
        create_date -> Timestamptz,
        update_date -> Timestamptz,
    }
}

diesel::joinable!(procedure_user_assignments -> plans (plan_id));
diesel::joinable!(procedure_user_assignments -> procedures (procedure_id));
diesel::joinable!(procedure_user_assignments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    plans,
    procedures,
    procedure_user_assignments,
    users,
);
