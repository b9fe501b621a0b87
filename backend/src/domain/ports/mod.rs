//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_repository;
mod procedure_assignment_command;
mod procedure_assignment_query;

#[cfg(test)]
pub use assignment_repository::MockAssignmentRepository;
pub use assignment_repository::{AssignmentRepository, AssignmentRepositoryError};
#[cfg(test)]
pub use procedure_assignment_command::MockProcedureAssignmentCommand;
#[cfg(any(test, feature = "test-support"))]
pub use procedure_assignment_command::FixtureProcedureAssignmentCommand;
pub use procedure_assignment_command::{AssignUsersRequest, ProcedureAssignmentCommand};
#[cfg(test)]
pub use procedure_assignment_query::MockProcedureAssignmentQuery;
#[cfg(any(test, feature = "test-support"))]
pub use procedure_assignment_query::FixtureProcedureAssignmentQuery;
pub use procedure_assignment_query::ProcedureAssignmentQuery;
