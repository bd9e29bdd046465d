//! Friend clock configuration: which users get a hand and where it points.
//!
//! The document is JSON and accepts both the snake_case field names below
//! and the camelCase names used by existing clock firmware configs:
//!
//! ```json
//! {
//!   "handFriend": ["alice", "bob"],
//!   "labelAngle": {"home": 0, "work": 90, "moving": 180, "unknown": 270, "error": 315}
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geofence::{DEFAULT_VELOCITY_THRESHOLD_KMH, Label, LabelingConfig};
use super::user::Username;

/// Label-table key consulted when no explicit error angle is configured.
pub const ERROR_LABEL: &str = "error";

/// Static configuration for `GET /hand-angles`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClockConfig {
    /// Users with a hand, in hand order.
    #[serde(default, alias = "handFriend")]
    pub tracked_users: Vec<Username>,
    /// Angle in degrees for each label.
    #[serde(default, alias = "labelAngle")]
    pub label_angles: HashMap<String, f64>,
    /// Angle for users without a fix or with an unmapped label.
    #[serde(default, alias = "errorAngle")]
    pub error_angle: Option<f64>,
    /// Overrides the `moving` threshold in km/h.
    #[serde(default, alias = "velocityThresholdKmh")]
    pub velocity_threshold_kmh: Option<f64>,
}

impl ClockConfig {
    /// Parse a JSON clock document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Angle reported when a hand cannot be placed.
    ///
    /// Falls back to the `error` entry of the label table, then to zero.
    pub fn error_angle(&self) -> f64 {
        self.error_angle
            .or_else(|| self.label_angles.get(ERROR_LABEL).copied())
            .unwrap_or(0.0)
    }

    /// Angle for a derived label, or the error angle when unmapped.
    pub fn angle_for(&self, label: &Label) -> f64 {
        self.label_angles
            .get(label.as_str())
            .copied()
            .unwrap_or_else(|| self.error_angle())
    }

    /// Labeling tunables derived from this configuration.
    pub fn labeling(&self) -> LabelingConfig {
        LabelingConfig {
            velocity_threshold_kmh: self
                .velocity_threshold_kmh
                .unwrap_or(DEFAULT_VELOCITY_THRESHOLD_KMH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn firmware_config() -> ClockConfig {
        ClockConfig::from_json(
            r#"{
                "handFriend": ["alice", "bob"],
                "labelAngle": {"home": 0, "work": 90, "moving": 180, "error": 315}
            }"#,
        )
        .expect("valid clock config")
    }

    #[rstest]
    fn accepts_camel_case_firmware_documents(firmware_config: ClockConfig) {
        let names: Vec<&str> = firmware_config
            .tracked_users
            .iter()
            .map(Username::as_str)
            .collect();
        assert_eq!(names, ["alice", "bob"]);
        assert_eq!(firmware_config.error_angle(), 315.0);
    }

    #[rstest]
    #[case(Label::Region("work".to_owned()), 90.0)]
    #[case(Label::Moving, 180.0)]
    #[case(Label::Unknown, 315.0)]
    #[case(Label::Region("gym".to_owned()), 315.0)]
    fn unmapped_labels_use_error_angle(
        firmware_config: ClockConfig,
        #[case] label: Label,
        #[case] expected: f64,
    ) {
        assert_eq!(firmware_config.angle_for(&label), expected);
    }

    #[rstest]
    fn explicit_error_angle_wins(mut firmware_config: ClockConfig) {
        firmware_config.error_angle = Some(42.0);
        assert_eq!(firmware_config.error_angle(), 42.0);
    }

    #[rstest]
    fn empty_document_is_valid() {
        let config = ClockConfig::from_json("{}").expect("empty config");
        assert!(config.tracked_users.is_empty());
        assert_eq!(config.error_angle(), 0.0);
        assert_eq!(config.labeling(), LabelingConfig::default());
    }
}
