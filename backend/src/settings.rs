//! Process configuration loaded via OrthoConfig.
//!
//! Every value can come from a `--flag`, a `GROUPTRACK_*` environment
//! variable, or a config file. Accessors apply the defaults and turn the raw
//! strings into the typed values the server and admin tool use.

use std::net::SocketAddr;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::ClockConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_STATIC_DIR: &str = "static";

/// Errors turning raw settings into typed configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not `host:port`.
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    /// `storage` names no known backend.
    #[error("unknown storage backend '{0}' (expected 'file' or 'postgres')")]
    UnknownBackend(String),
    /// The PostgreSQL backend was selected without a URL.
    #[error("storage 'postgres' requires database_url")]
    MissingDatabaseUrl,
    /// A directory setting is not valid UTF-8.
    #[error("path {0:?} is not valid UTF-8")]
    NonUtf8Path(PathBuf),
    /// The clock document could not be read or parsed.
    #[error("cannot load clock config {path:?}: {message}")]
    ClockConfig { path: PathBuf, message: String },
}

/// Raw settings as loaded from flags, environment, and config file.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GROUPTRACK")]
pub struct Settings {
    /// Listen address (`host:port`).
    pub bind_addr: Option<String>,
    /// Storage backend: `file` or `postgres`.
    pub storage: Option<String>,
    /// Directory for the file backend's JSON documents.
    pub data_dir: Option<PathBuf>,
    /// Root for static assets.
    pub static_dir: Option<PathBuf>,
    /// PostgreSQL URL for the `postgres` backend.
    pub database_url: Option<String>,
    /// Maximum pooled PostgreSQL connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Path to the friend clock JSON document.
    pub clock_config: Option<PathBuf>,
    /// Maps API key handed to the static map page via cookie.
    pub maps_api_key: Option<String>,
}

/// The storage strategy selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON documents under a local directory.
    File { data_dir: Utf8PathBuf },
    /// PostgreSQL via a pooled connection.
    Postgres { database_url: String, max_size: u32 },
}

fn utf8(path: PathBuf) -> Result<Utf8PathBuf, SettingsError> {
    Utf8PathBuf::from_path_buf(path).map_err(SettingsError::NonUtf8Path)
}

impl Settings {
    /// Listen address, defaulting to `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Selected backend, defaulting to the file backend under `data`.
    pub fn storage_backend(&self) -> Result<StorageBackend, SettingsError> {
        match self.storage.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("file") => Ok(StorageBackend::File {
                data_dir: utf8(
                    self.data_dir
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
                )?,
            }),
            Some("postgres" | "postgresql") => Ok(StorageBackend::Postgres {
                database_url: self
                    .database_url
                    .clone()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(SettingsError::MissingDatabaseUrl)?,
                max_size: self.pool_max_size,
            }),
            Some(_) => Err(SettingsError::UnknownBackend(
                self.storage.clone().unwrap_or_default(),
            )),
        }
    }

    /// Static root, defaulting to `static`.
    pub fn static_dir(&self) -> Result<Utf8PathBuf, SettingsError> {
        utf8(
            self.static_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        )
    }

    /// The clock document, or an empty configuration when none is set.
    pub fn clock(&self) -> Result<ClockConfig, SettingsError> {
        let Some(path) = &self.clock_config else {
            return Ok(ClockConfig::default());
        };
        let clock_error = |message: String| SettingsError::ClockConfig {
            path: path.clone(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|err| clock_error(err.to_string()))?;
        ClockConfig::from_json(&raw).map_err(|err| clock_error(err.to_string()))
    }

    /// Maps API key, ignoring blank values.
    pub fn maps_api_key(&self) -> Option<String> {
        self.maps_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "GROUPTRACK_BIND_ADDR",
        "GROUPTRACK_STORAGE",
        "GROUPTRACK_DATA_DIR",
        "GROUPTRACK_STATIC_DIR",
        "GROUPTRACK_DATABASE_URL",
        "GROUPTRACK_POOL_MAX_SIZE",
        "GROUPTRACK_CLOCK_CONFIG",
        "GROUPTRACK_MAPS_API_KEY",
    ];

    fn load_from_empty_args() -> Settings {
        Settings::load_from_iter([OsString::from("grouptrack")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:3000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.storage_backend().expect("backend"),
            StorageBackend::File {
                data_dir: Utf8PathBuf::from("data")
            }
        );
        assert_eq!(settings.static_dir().expect("static"), Utf8PathBuf::from("static"));
        assert_eq!(settings.clock().expect("clock"), ClockConfig::default());
        assert_eq!(settings.maps_api_key(), None);
        assert_eq!(settings.pool_max_size, 10);
    }

    #[rstest]
    fn postgres_pool_size_defaults_when_unset() {
        let mut vars = cleared();
        vars.push(("GROUPTRACK_STORAGE", Some("postgres".to_owned())));
        vars.push((
            "GROUPTRACK_DATABASE_URL",
            Some("postgres://tracker@db/grouptrack".to_owned()),
        ));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.storage_backend().expect("backend"),
            StorageBackend::Postgres {
                database_url: "postgres://tracker@db/grouptrack".to_owned(),
                max_size: 10,
            }
        );
    }

    #[rstest]
    fn environment_selects_postgres() {
        let mut vars = cleared();
        vars.push(("GROUPTRACK_STORAGE", Some("Postgres".to_owned())));
        vars.push((
            "GROUPTRACK_DATABASE_URL",
            Some("postgres://tracker@db/grouptrack".to_owned()),
        ));
        vars.push(("GROUPTRACK_POOL_MAX_SIZE", Some("4".to_owned())));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.storage_backend().expect("backend"),
            StorageBackend::Postgres {
                database_url: "postgres://tracker@db/grouptrack".to_owned(),
                max_size: 4,
            }
        );
    }

    #[rstest]
    #[case(Some("postgres"), None, "requires database_url")]
    #[case(Some("dynamo"), None, "unknown storage backend 'dynamo'")]
    fn invalid_backends_are_reported(
        #[case] storage: Option<&str>,
        #[case] database_url: Option<&str>,
        #[case] expected: &str,
    ) {
        let settings = Settings {
            storage: storage.map(str::to_owned),
            database_url: database_url.map(str::to_owned),
            ..Settings::default()
        };
        let err = settings.storage_backend().expect_err("invalid backend");
        assert!(err.to_string().contains(expected), "{err}");
    }

    #[rstest]
    fn clock_config_is_read_from_the_configured_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("clock.json");
        std::fs::write(
            &path,
            r#"{"handFriend": ["alice"], "labelAngle": {"home": 30, "error": 300}}"#,
        )
        .expect("write clock config");
        let settings = Settings {
            clock_config: Some(path),
            ..Settings::default()
        };

        let clock = settings.clock().expect("clock");
        assert_eq!(clock.tracked_users.len(), 1);
        assert_eq!(clock.error_angle(), 300.0);
    }

    #[rstest]
    fn bad_bind_addresses_are_rejected() {
        let settings = Settings {
            bind_addr: Some("localhost".to_owned()),
            ..Settings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
