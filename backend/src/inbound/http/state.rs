//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccessControl, LocationSharing};

use super::static_files::StaticAssets;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authenticates every request.
    pub access: Arc<dyn AccessControl>,
    /// Location, rectangle, and clock use-cases.
    pub sharing: Arc<dyn LocationSharing>,
    /// Fallback responder for unmatched `GET`s.
    pub assets: StaticAssets,
}

impl HttpState {
    /// Bundle the ports with the static responder.
    pub fn new(
        access: Arc<dyn AccessControl>,
        sharing: Arc<dyn LocationSharing>,
        assets: StaticAssets,
    ) -> Self {
        Self {
            access,
            sharing,
            assets,
        }
    }
}
