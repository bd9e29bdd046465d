//! Location fixes as published by OwnTracks devices.
//!
//! The payload is kept as a free-form JSON object so fields the device sends
//! (battery, accuracy, altitude, ...) survive storage and reach other group
//! members unchanged. Only the handful of fields the service reasons about
//! get typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::user::Username;

/// `_type` value identifying a position report.
pub const LOCATION_MESSAGE_TYPE: &str = "location";

/// Error raised when a published body is not a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("location payload must be a JSON object")]
pub struct NotAnObject;

/// A single published fix.
///
/// # Examples
/// ```
/// use grouptrack::domain::LocationFix;
/// use serde_json::json;
///
/// let fix =
///     LocationFix::try_from(json!({"_type": "location", "lat": 10.0, "lon": 10.0, "vel": 2}))
///         .unwrap();
/// assert!(fix.is_location());
/// assert_eq!(fix.velocity(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationFix(Map<String, Value>);

impl LocationFix {
    /// Wrap an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The OwnTracks message type (`_type`).
    pub fn message_type(&self) -> Option<&str> {
        self.0.get("_type").and_then(Value::as_str)
    }

    /// Whether this message is a position report worth persisting.
    pub fn is_location(&self) -> bool {
        self.message_type() == Some(LOCATION_MESSAGE_TYPE)
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> Option<f64> {
        self.number("lat")
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> Option<f64> {
        self.number("lon")
    }

    /// Velocity in km/h; devices omit it when stationary.
    pub fn velocity(&self) -> f64 {
        self.number("vel").unwrap_or(0.0)
    }

    /// Fix time in epoch seconds (`tst`).
    pub fn timestamp(&self) -> Option<i64> {
        self.0.get("tst").and_then(Value::as_i64)
    }

    /// Copy of the fix tagged with the owner's username as `tid`.
    pub fn with_tid(&self, username: &Username) -> Self {
        let mut fields = self.0.clone();
        fields.insert("tid".to_owned(), Value::String(username.to_string()));
        Self(fields)
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }
}

impl TryFrom<Value> for LocationFix {
    type Error = NotAnObject;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(NotAnObject),
        }
    }
}

impl From<LocationFix> for Value {
    fn from(value: LocationFix) -> Self {
        Value::Object(value.0)
    }
}

/// A group member's latest fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLocation {
    /// Owner of the fix.
    pub username: Username,
    /// The stored payload, without any injected `tid`.
    pub location: LocationFix,
}
