//! Server construction and middleware wiring.

mod config;

pub use config::{ServerSettings, SettingsError};

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tokio_util::sync::CancellationToken;

use planner::Trace;
#[cfg(debug_assertions)]
use planner::doc::ApiDoc;
use planner::domain::ProcedureAssignmentService;
use planner::inbound::http::assignments;
use planner::inbound::http::health::{HealthState, live, ready};
use planner::inbound::http::state::HttpState;
use planner::outbound::persistence::{DbPool, DieselAssignmentRepository};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Everything the HTTP server needs once startup checks have passed.
pub struct ServerConfig {
    bind_addr: SocketAddr,
    db_pool: DbPool,
    shutdown: CancellationToken,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, shutdown: CancellationToken) -> Self {
        Self {
            bind_addr,
            db_pool,
            shutdown,
        }
    }
}

fn build_http_state(pool: DbPool, shutdown: CancellationToken) -> HttpState {
    let repo = Arc::new(DieselAssignmentRepository::new(pool, Arc::new(DefaultClock)));
    let service = Arc::new(ProcedureAssignmentService::new(repo));
    HttpState::new(service.clone(), service, shutdown)
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1").configure(assignments::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the HTTP server.
///
/// The returned [`Server`] must be awaited to drive the listener. Signal
/// handling and readiness are left to the caller.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        db_pool,
        shutdown,
    } = config;
    let http_state = web::Data::new(build_http_state(db_pool, shutdown));

    let server = HttpServer::new(move || build_app(health_state.clone(), http_state.clone()))
        .disable_signals()
        .bind(bind_addr)?
        .run();

    Ok(server)
}
