//! HTTP inbound adapter exposing the OwnTracks-compatible endpoints.

pub mod auth;
pub mod body;
pub mod clock;
pub mod error;
pub mod geofences;
pub mod locations;
pub mod routes;
pub mod state;
pub mod static_files;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
pub use routes::configure;
pub use state::HttpState;
pub use static_files::StaticAssets;
