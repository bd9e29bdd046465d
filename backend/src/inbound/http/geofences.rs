//! `POST /update-rects` and `GET /get-rects`.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::domain::Rect;

use super::ApiResult;
use super::auth::Caller;
use super::body::parse_json;
use super::state::HttpState;

/// Acknowledgement body for a replaced rectangle set.
#[derive(Debug, Serialize)]
pub struct SavedResponse {
    msg: &'static str,
}

/// Replace the global rectangle set.
pub async fn update_rects(
    _caller: Caller,
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let rects: Vec<Rect> = parse_json(&body)?;
    state.sharing.replace_rects(rects).await?;
    Ok(HttpResponse::Ok().json(SavedResponse {
        msg: "saved successfully",
    }))
}

/// The current rectangles in stored order.
pub async fn get_rects(_caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let rects = state.sharing.rects().await?;
    Ok(HttpResponse::Ok().json(rects))
}
