//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use camino::Utf8PathBuf;
use grouptrack::domain::ClockConfig;
use grouptrack::settings::{Settings, SettingsError};

/// Everything the HTTP server needs besides storage.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) static_dir: Utf8PathBuf,
    pub(crate) maps_api_key: Option<String>,
    pub(crate) clock: ClockConfig,
}

impl ServerConfig {
    /// Resolve the server configuration from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the bind address, static root, or
    /// clock document is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            static_dir: settings.static_dir()?,
            maps_api_key: settings.maps_api_key(),
            clock: settings.clock()?,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
