//! Procedure user assignment backend.
//!
//! Layout follows ports and adapters: [`domain`] holds the reconciliation
//! rules and port traits, [`inbound`] the actix-web handlers, and
//! [`outbound`] the Diesel persistence adapter.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
