//! Friend-clock endpoints: `GET /friend-labels` and `GET /hand-angles`.

use actix_web::{HttpResponse, web};

use super::ApiResult;
use super::auth::Caller;
use super::state::HttpState;

/// `{username, label}` for every member of the caller's group with a fix.
pub async fn friend_labels(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let labels = state.sharing.friend_labels(caller.user()).await?;
    Ok(HttpResponse::Ok().json(labels))
}

/// One angle per configured clock hand, in configured order.
pub async fn hand_angles(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let angles = state.sharing.hand_angles(caller.user()).await?;
    Ok(HttpResponse::Ok().json(angles))
}
