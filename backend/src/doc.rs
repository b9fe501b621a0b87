//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the assignment and health endpoints together with the
//! schema wrappers from [`crate::inbound::http::schemas`]. Swagger UI serves
//! it in debug builds and `openapi-dump` prints it for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::assignments::{AssignUserToProcedureRequest, AssignmentResponse};
use crate::inbound::http::schemas::{ApiResponseSchema, ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Planner backend API",
        description = "Assign users to the procedures of a plan."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::assignments::assign_users,
        crate::inbound::http::assignments::list_assignments,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AssignUserToProcedureRequest,
        AssignmentResponse,
        ApiResponseSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "assignments", description = "Procedure user assignments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
