//! Named rectangular regions and the location → label derivation.
//!
//! Labeling rules:
//! - faster than the configured threshold → `moving`, wherever the fix is;
//! - otherwise the smallest-area rectangle strictly containing the fix, with
//!   ties on area going to the earliest rectangle in stored order;
//! - otherwise `unknown`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::LocationFix;

/// Label for fixes above the velocity threshold.
pub const MOVING_LABEL: &str = "moving";
/// Label for fixes outside every rectangle.
pub const UNKNOWN_LABEL: &str = "unknown";
/// Default velocity threshold in km/h (a slow jog).
pub const DEFAULT_VELOCITY_THRESHOLD_KMH: f64 = 6.0;

/// A named latitude/longitude box.
///
/// Bounds are not validated: a rectangle with `north <= south` or
/// `east <= west` simply never contains anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Label reported for fixes inside this rectangle.
    pub name: String,
    /// Upper latitude bound.
    pub north: f64,
    /// Lower latitude bound.
    pub south: f64,
    /// Upper longitude bound.
    pub east: f64,
    /// Lower longitude bound.
    pub west: f64,
}

impl Rect {
    /// Strict containment: points on an edge are outside.
    ///
    /// # Examples
    /// ```
    /// use grouptrack::domain::Rect;
    ///
    /// let home = Rect { name: "home".into(), north: 2.0, south: 0.0, east: 2.0, west: 0.0 };
    /// assert!(home.contains(1.0, 1.0));
    /// assert!(!home.contains(2.0, 1.0));
    /// ```
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.south < lat && lat < self.north && self.west < lon && lon < self.east
    }

    /// Area in square degrees, used only to rank nested regions.
    pub fn area(&self) -> f64 {
        (self.north - self.south) * (self.east - self.west)
    }
}

/// Tunables for label derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Fixes strictly faster than this (km/h) are labelled `moving`.
    pub velocity_threshold_kmh: f64,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            velocity_threshold_kmh: DEFAULT_VELOCITY_THRESHOLD_KMH,
        }
    }
}

/// Outcome of labeling a fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Above the velocity threshold.
    Moving,
    /// Inside the named rectangle.
    Region(String),
    /// Outside every rectangle, or without coordinates.
    Unknown,
}

impl Label {
    /// Wire form of the label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Moving => MOVING_LABEL,
            Self::Region(name) => name.as_str(),
            Self::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The smallest rectangle strictly containing the point, if any.
pub fn enclosing_rect(rects: &[Rect], lat: f64, lon: f64) -> Option<&Rect> {
    rects
        .iter()
        .filter(|rect| rect.contains(lat, lon))
        .fold(None, |best: Option<&Rect>, rect| match best {
            Some(current) if current.area() <= rect.area() => Some(current),
            _ => Some(rect),
        })
}

/// Derive the label for a fix.
///
/// # Examples
/// ```
/// use grouptrack::domain::{label_location, LabelingConfig, LocationFix, Rect};
/// use serde_json::json;
///
/// let rects = vec![Rect { name: "park".into(), north: 11.0, south: 9.0, east: 11.0, west: 9.0 }];
/// let fix = LocationFix::try_from(json!({"lat": 10.0, "lon": 10.0, "vel": 1})).unwrap();
/// assert_eq!(label_location(&fix, &rects, &LabelingConfig::default()).as_str(), "park");
/// ```
pub fn label_location(fix: &LocationFix, rects: &[Rect], config: &LabelingConfig) -> Label {
    if fix.velocity() > config.velocity_threshold_kmh {
        return Label::Moving;
    }
    let (Some(lat), Some(lon)) = (fix.lat(), fix.lon()) else {
        return Label::Unknown;
    };
    enclosing_rect(rects, lat, lon)
        .map_or(Label::Unknown, |rect| Label::Region(rect.name.clone()))
}
