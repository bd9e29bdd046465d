//! `POST /pub`: publish a fix and receive the group's other fixes.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use crate::domain::{Error, LocationFix};

use super::ApiResult;
use super::auth::Caller;
use super::body::parse_json;
use super::state::HttpState;

/// Store the caller's location message and answer with every other group
/// member's latest fix, each tagged with `tid`.
///
/// Non-location messages are accepted without being stored.
pub async fn publish(
    caller: Caller,
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let message = LocationFix::try_from(parse_json::<Value>(&body)?)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let others = state.sharing.publish(caller.user(), message).await?;
    Ok(HttpResponse::Ok().json(others))
}
