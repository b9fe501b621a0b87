//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised without a database.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::ports::{ProcedureAssignmentCommand, ProcedureAssignmentQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub assignments: Arc<dyn ProcedureAssignmentCommand>,
    pub assignments_query: Arc<dyn ProcedureAssignmentQuery>,
    /// Server-wide shutdown signal; handlers pass child tokens to commands.
    pub shutdown: CancellationToken,
}

impl HttpState {
    /// Build state from port implementations and the shutdown token.
    pub fn new(
        assignments: Arc<dyn ProcedureAssignmentCommand>,
        assignments_query: Arc<dyn ProcedureAssignmentQuery>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            assignments,
            assignments_query,
            shutdown,
        }
    }

    /// Token for one request, cancelled when the server shuts down.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
