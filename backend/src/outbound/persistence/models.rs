//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; conversions into domain types
//! live alongside them so malformed rows surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    CredentialRecord, FriendGroup, LocationFix, MemberLocation, Rect, StoredPassword, Username,
};

use super::schema::{geofences, locations, users};

/// Credential columns read for authentication.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub hashed_password: String,
    pub friend_group: String,
}

impl TryFrom<UserRow> for CredentialRecord {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let friend_group = FriendGroup::new(row.friend_group)
            .map_err(|err| format!("stored friend group is invalid: {err}"))?;
        Ok(Self {
            hashed_password: StoredPassword::from_stored(row.hashed_password),
            friend_group,
        })
    }
}

/// Insertable account awaiting its first login.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub hashed_password: &'a str,
    pub friend_group: &'a str,
}

/// A stored fix and its owner.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LocationRow {
    pub username: String,
    pub location: serde_json::Value,
}

impl TryFrom<LocationRow> for MemberLocation {
    type Error = String;

    fn try_from(row: LocationRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username)
            .map_err(|err| format!("stored username is invalid: {err}"))?;
        let location = LocationFix::try_from(row.location)
            .map_err(|err| format!("stored location for {username} is invalid: {err}"))?;
        Ok(Self { username, location })
    }
}

/// Upsert payload for the latest fix.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = locations)]
pub(crate) struct NewLocationRow<'a> {
    pub username: &'a str,
    pub friend_group: &'a str,
    pub location: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// One rectangle at its stored position.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = geofences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GeofenceRow {
    pub position: i32,
    pub name: String,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeofenceRow {
    pub(crate) fn at(position: i32, rect: &Rect) -> Self {
        Self {
            position,
            name: rect.name.clone(),
            north: rect.north,
            south: rect.south,
            east: rect.east,
            west: rect.west,
        }
    }
}

impl From<GeofenceRow> for Rect {
    fn from(row: GeofenceRow) -> Self {
        Self {
            name: row.name,
            north: row.north,
            south: row.south,
            east: row.east,
            west: row.west,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("tbd", true)]
    #[case("30c952fab122c3f9759f02a6d95c3758b246b4fee239957b2d4fee46e26170c4", false)]
    fn user_rows_decode_password_state(#[case] stored: &str, #[case] unset: bool) {
        let record = CredentialRecord::try_from(UserRow {
            hashed_password: stored.to_owned(),
            friend_group: "g1".to_owned(),
        })
        .expect("valid row");
        assert_eq!(record.hashed_password.is_unset(), unset);
    }

    #[test]
    fn blank_friend_groups_are_rejected() {
        let err = CredentialRecord::try_from(UserRow {
            hashed_password: "tbd".to_owned(),
            friend_group: "  ".to_owned(),
        })
        .expect_err("blank group");
        assert!(err.contains("friend group"), "{err}");
    }

    #[test]
    fn non_object_locations_are_rejected() {
        let err = MemberLocation::try_from(LocationRow {
            username: "alice".to_owned(),
            location: json!([1, 2]),
        })
        .expect_err("array payload");
        assert!(err.contains("alice"), "{err}");
    }

    #[test]
    fn geofence_rows_keep_bounds() {
        let rect = Rect {
            name: "home".into(),
            north: 2.0,
            south: 1.0,
            east: 4.0,
            west: 3.0,
        };
        assert_eq!(Rect::from(GeofenceRow::at(0, &rect)), rect);
    }
}
