//! OpenAPI schema definitions for domain types.
//!
//! Domain types do not derive `ToSchema`; the wrappers below mirror their
//! serialised shape so the document stays in step with the wire format.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request failed validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// A referenced plan, procedure, or user does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request was cancelled before completing.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "UserId: 4 not found")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for the `ApiResponse` envelope returned by commands
/// without a payload.
#[derive(ToSchema)]
#[schema(as = crate::domain::ApiResponse)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ApiResponseSchema {
    /// Whether the command succeeded.
    succeeded: bool,
    /// Always `null` for commands without a payload.
    value: Option<serde_json::Value>,
    /// Failure details when `succeeded` is false.
    exception: Option<ErrorSchema>,
}
