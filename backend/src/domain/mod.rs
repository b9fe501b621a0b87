//! Domain primitives, ports, and services.
//!
//! Purpose: hold the transport- and storage-agnostic core of procedure user
//! assignment. Inbound adapters call the driving ports in [`ports`]; the
//! Diesel adapter implements the driven [`ports::AssignmentRepository`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: API error payload and its stable identifier.
//! - `PlanId`, `ProcedureId`, `UserId`, `AssignmentId`: positive integer ids.
//! - `ProcedureUserAssignment` and `AssignmentChanges`: rows and the
//!   reconciliation diff.
//! - `ApiResponse`: success/failure envelope for command endpoints.
//! - `ProcedureAssignmentService`: implementation of the driving ports.

pub mod api_response;
pub mod assignment;
pub mod assignment_service;
pub mod error;
pub mod ids;
pub mod ports;
pub mod trace_id;

pub use self::api_response::ApiResponse;
pub use self::assignment::{
    AssignmentChanges, NewProcedureUserAssignment, ProcedureUserAssignment,
};
pub use self::assignment_service::ProcedureAssignmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{AssignmentId, IdValidationError, PlanId, ProcedureId, UserId};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
