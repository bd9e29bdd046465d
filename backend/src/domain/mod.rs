//! Domain primitives, ports, and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP adapter,
//! the storage backends, and the admin tooling, plus the services that
//! implement the driving ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Username / FriendGroup / CredentialRecord: account identity.
//! - BasicCredentials / StoredPassword: request credentials and stored
//!   password state.
//! - LocationFix / Rect / Label: location messages and geofence labeling.
//! - AccessService / TrackingService: driving-port implementations.

pub mod access_service;
pub mod auth;
pub mod clock;
pub mod error;
pub mod geofence;
pub mod location;
pub mod ports;
pub mod trace_id;
pub mod tracking_service;
pub mod user;

pub use self::access_service::AccessService;
pub use self::auth::{
    AuthenticatedUser, BasicCredentials, CredentialsParseError, StoredPassword, UNSET_PASSWORD,
    hash_password,
};
pub use self::clock::ClockConfig;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geofence::{Label, LabelingConfig, Rect, enclosing_rect, label_location};
pub use self::location::{LocationFix, MemberLocation, NotAnObject};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::tracking_service::TrackingService;
pub use self::user::{CredentialRecord, FriendGroup, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use grouptrack::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
