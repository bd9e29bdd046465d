//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::domain::ports::{MockAccessControl, MockLocationSharing};
use crate::domain::{AuthenticatedUser, FriendGroup, Username};

use super::state::HttpState;
use super::static_files::StaticAssets;

/// The caller used across handler tests: `alice` in group `g1`.
pub fn alice() -> AuthenticatedUser {
    AuthenticatedUser {
        username: Username::new("alice").expect("username"),
        friend_group: FriendGroup::new("g1").expect("group"),
    }
}

/// Access control that accepts any credentials as [`alice`].
pub fn accept_alice() -> MockAccessControl {
    let mut access = MockAccessControl::new();
    access.expect_authenticate().returning(|_| Ok(alice()));
    access
}

/// State over the given mocks with static serving disabled.
pub fn state_with(access: MockAccessControl, sharing: MockLocationSharing) -> HttpState {
    HttpState::new(Arc::new(access), Arc::new(sharing), StaticAssets::disabled())
}

/// Attach `Authorization: Basic` for `alice:pw`.
pub fn authorized(req: TestRequest) -> TestRequest {
    req.insert_header((AUTHORIZATION, format!("Basic {}", STANDARD.encode("alice:pw"))))
}
