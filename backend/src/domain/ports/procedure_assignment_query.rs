//! Driving port for reading a procedure's assignments.

use async_trait::async_trait;

use crate::domain::{Error, ProcedureUserAssignment};

/// Read side of procedure assignments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcedureAssignmentQuery: Send + Sync {
    /// Assignments of `procedure_id`, ordered by surrogate id.
    ///
    /// A non-positive id is an `invalid_request`; an unknown procedure yields
    /// an empty list.
    async fn list_assignments(
        &self,
        procedure_id: i32,
    ) -> Result<Vec<ProcedureUserAssignment>, Error>;
}

/// Fixture implementation returning no assignments.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProcedureAssignmentQuery;

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl ProcedureAssignmentQuery for FixtureProcedureAssignmentQuery {
    async fn list_assignments(
        &self,
        _procedure_id: i32,
    ) -> Result<Vec<ProcedureUserAssignment>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_query_returns_empty_list() {
        let rows = FixtureProcedureAssignmentQuery
            .list_assignments(1)
            .await
            .expect("fixture query succeeds");
        assert!(rows.is_empty());
    }
}
