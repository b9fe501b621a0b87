//! Success/failure envelope returned by command endpoints.

use serde::{Deserialize, Serialize};

use super::Error;

/// Uniform result envelope.
///
/// Exactly one of `value` and `exception` is populated; `succeeded` mirrors
/// which one.
///
/// # Examples
/// ```
/// use planner::domain::{ApiResponse, Error};
///
/// let ok: ApiResponse<()> = Ok(()).into();
/// assert!(ok.succeeded);
///
/// let failed: ApiResponse<()> = Err(Error::invalid_request("Invalid PlanId")).into();
/// assert!(!failed.succeeded);
/// assert!(failed.value.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub succeeded: bool,
    pub value: Option<T>,
    pub exception: Option<Error>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `value`.
    pub fn succeed(value: T) -> Self {
        Self {
            succeeded: true,
            value: Some(value),
            exception: None,
        }
    }

    /// Failed envelope carrying `error`.
    pub fn fail(error: Error) -> Self {
        Self {
            succeeded: false,
            value: None,
            exception: Some(error),
        }
    }
}

impl<T> From<Result<T, Error>> for ApiResponse<T> {
    fn from(value: Result<T, Error>) -> Self {
        match value {
            Ok(value) => Self::succeed(value),
            Err(error) => Self::fail(error),
        }
    }
}
