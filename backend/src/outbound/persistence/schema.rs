//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly; `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Provisioned accounts.
    users (username) {
        /// Login name; never contains `:`.
        username -> Text,
        /// Hex SHA-256 digest, or `tbd` until the first login binds one.
        hashed_password -> Text,
        /// Group whose locations the account may read.
        friend_group -> Text,
        /// Provisioning time.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Latest fix per user.
    locations (username) {
        username -> Text,
        /// Copied from the owner's account at publish time.
        friend_group -> Text,
        /// The device payload as received.
        location -> Jsonb,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// The global rectangle set, ordered by `position`.
    geofences (position) {
        position -> Int4,
        name -> Text,
        north -> Float8,
        south -> Float8,
        east -> Float8,
        west -> Float8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, locations, geofences);
