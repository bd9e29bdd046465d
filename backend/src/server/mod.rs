//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use grouptrack::Trace;
use grouptrack::domain::ports::StoragePorts;
use grouptrack::inbound::http::{HttpState, configure};

fn build_app(
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
    App::new()
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure)
}

/// Construct an Actix HTTP server over the opened storage.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(ports: &StoragePorts, config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(ports, &config);
    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(config.bind_addr())?
        .run();
    Ok(server)
}
