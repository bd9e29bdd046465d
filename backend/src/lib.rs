//! Location sharing backend library modules.
//!
//! The HTTP adapter, storage backends, and admin tooling all build on the
//! domain types and ports defined here; the binaries only wire them up.

pub mod admin;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use domain::TraceId;
/// Middleware attaching a request-scoped trace identifier.
pub use middleware::Trace;
