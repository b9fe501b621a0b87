//! Procedure user assignment HTTP handlers.
//!
//! ```text
//! POST /api/v1/procedure-user-assignments/assign
//! GET  /api/v1/procedure-user-assignments?procedureId=N
//! ```
//!
//! The command endpoint always answers with an `ApiResponse` envelope, even
//! for malformed bodies; the status code mirrors the envelope's error code.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::AssignUsersRequest;
use crate::domain::{ApiResponse, Error, ProcedureUserAssignment};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{redact_if_internal, status_for};
use crate::inbound::http::schemas::{ApiResponseSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Request payload for `AssignUserToProcedure`.
///
/// Missing ids default to zero and are rejected by validation; a missing or
/// `null` user list means "unassign everyone".
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignUserToProcedureRequest {
    #[serde(default)]
    #[schema(example = 1)]
    pub plan_id: i32,
    #[serde(default)]
    #[schema(example = 1)]
    pub procedure_id: i32,
    #[serde(default)]
    #[schema(example = json!([1, 2, 3]))]
    pub user_ids: Option<Vec<i32>>,
}

impl From<AssignUserToProcedureRequest> for AssignUsersRequest {
    fn from(value: AssignUserToProcedureRequest) -> Self {
        Self {
            plan_id: value.plan_id,
            procedure_id: value.procedure_id,
            user_ids: value.user_ids.unwrap_or_default(),
        }
    }
}

/// Query string for listing a procedure's assignments.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListAssignmentsParams {
    /// Procedure whose assignments are listed.
    pub procedure_id: i32,
}

/// Response item for a stored assignment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub procedure_user_assignment_id: i32,
    pub plan_id: i32,
    pub procedure_id: i32,
    pub user_id: i32,
    /// RFC 3339 creation timestamp.
    pub create_date: String,
    /// RFC 3339 update timestamp.
    pub update_date: String,
}

impl From<ProcedureUserAssignment> for AssignmentResponse {
    fn from(value: ProcedureUserAssignment) -> Self {
        Self {
            procedure_user_assignment_id: value.id.get(),
            plan_id: value.plan_id.get(),
            procedure_id: value.procedure_id.get(),
            user_id: value.user_id.get(),
            create_date: value.create_date.to_rfc3339(),
            update_date: value.update_date.to_rfc3339(),
        }
    }
}

/// Render a command outcome as an `ApiResponse` envelope.
pub(crate) fn envelope_response(outcome: Result<(), Error>) -> HttpResponse {
    match outcome {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::succeed(())),
        Err(error) => HttpResponse::build(status_for(error.code()))
            .json(ApiResponse::<()>::fail(redact_if_internal(&error))),
    }
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = Error::invalid_request(format!("invalid request body: {err}"));
    let response = envelope_response(Err(error));
    InternalError::from_response(err, response).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

/// Register the assignment handlers and their extractor configuration.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(assign_users)
        .service(list_assignments);
}

/// Make a procedure's assigned users equal the requested set.
#[utoipa::path(
    post,
    path = "/api/v1/procedure-user-assignments/assign",
    description = "Reconcile the users assigned to a procedure. Existing \
        assignments for users still requested are kept unchanged.",
    request_body = AssignUserToProcedureRequest,
    responses(
        (status = 200, description = "Assignments reconciled", body = ApiResponseSchema),
        (status = 400, description = "Invalid plan or procedure id", body = ApiResponseSchema),
        (status = 404, description = "Plan, procedure, or user not found", body = ApiResponseSchema),
        (status = 500, description = "Internal server error", body = ApiResponseSchema),
        (status = 503, description = "Request cancelled", body = ApiResponseSchema)
    ),
    tags = ["assignments"],
    operation_id = "assignUserToProcedure"
)]
#[post("/procedure-user-assignments/assign")]
pub async fn assign_users(
    state: web::Data<HttpState>,
    payload: web::Json<AssignUserToProcedureRequest>,
) -> HttpResponse {
    let request = AssignUsersRequest::from(payload.into_inner());
    debug!(
        plan_id = request.plan_id,
        procedure_id = request.procedure_id,
        users = request.user_ids.len(),
        "assign users request"
    );
    let outcome = state
        .assignments
        .assign_users(request, state.request_token())
        .await;
    envelope_response(outcome)
}

/// List the assignments of a procedure, ordered by assignment id.
#[utoipa::path(
    get,
    path = "/api/v1/procedure-user-assignments",
    params(ListAssignmentsParams),
    responses(
        (status = 200, description = "Assignments of the procedure", body = [AssignmentResponse]),
        (status = 400, description = "Invalid procedure id", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "listProcedureUserAssignments"
)]
#[get("/procedure-user-assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    params: web::Query<ListAssignmentsParams>,
) -> ApiResult<web::Json<Vec<AssignmentResponse>>> {
    let rows = state
        .assignments_query
        .list_assignments(params.procedure_id)
        .await?;
    Ok(web::Json(rows.into_iter().map(AssignmentResponse::from).collect()))
}

#[cfg(test)]
#[path = "assignments_tests.rs"]
mod tests;
