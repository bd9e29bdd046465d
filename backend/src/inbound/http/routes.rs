//! Route table.
//!
//! Each endpoint answers one method. Any other method on a known path, and
//! every unknown path, falls through to [`fallback`] after authentication,
//! so callers see the static responder or a JSON 404 rather than a 405.

use actix_web::web;

use super::clock::{friend_labels, hand_angles};
use super::geofences::{get_rects, update_rects};
use super::locations::publish;
use super::static_files::fallback;

/// Register every endpoint and the fallback on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/pub")
            .route(web::post().to(publish))
            .default_service(web::to(fallback)),
    )
    .service(
        web::resource("/update-rects")
            .route(web::post().to(update_rects))
            .default_service(web::to(fallback)),
    )
    .service(
        web::resource("/get-rects")
            .route(web::get().to(get_rects))
            .default_service(web::to(fallback)),
    )
    .service(
        web::resource("/friend-labels")
            .route(web::get().to(friend_labels))
            .default_service(web::to(fallback)),
    )
    .service(
        web::resource("/hand-angles")
            .route(web::get().to(hand_angles))
            .default_service(web::to(fallback)),
    )
    .default_service(web::to(fallback));
}
