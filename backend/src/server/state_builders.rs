//! Builders for HTTP state from the opened storage ports.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use grouptrack::domain::ports::StoragePorts;
use grouptrack::domain::{AccessService, TrackingService};
use grouptrack::inbound::http::{HttpState, StaticAssets};

use super::ServerConfig;

/// Open the static root, serving nothing when it is unavailable.
fn build_static_assets(config: &ServerConfig) -> StaticAssets {
    match StaticAssets::open(&config.static_dir, config.maps_api_key.clone()) {
        Ok(assets) => assets,
        Err(error) => {
            warn!(
                static_dir = %config.static_dir,
                %error,
                "static root unavailable; unmatched GETs will return 404"
            );
            StaticAssets::disabled()
        }
    }
}

/// Wire the driving services onto the storage ports.
pub(super) fn build_http_state(
    ports: &StoragePorts,
    config: &ServerConfig,
) -> web::Data<HttpState> {
    let access = Arc::new(AccessService::new(ports.credentials.clone()));
    let sharing = Arc::new(TrackingService::new(
        ports.locations.clone(),
        ports.geofences.clone(),
        config.clock.clone(),
    ));
    web::Data::new(HttpState::new(access, sharing, build_static_assets(config)))
}
