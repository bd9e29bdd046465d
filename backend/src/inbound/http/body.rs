//! JSON request bodies parsed into typed 400s.
//!
//! Bodies arrive as raw bytes and are decoded here rather than through
//! `web::Json`, so a malformed payload produces the same error shape as
//! every other failure instead of Actix's plain-text rejection.

use actix_web::web::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::Error;

/// Decode `body` as JSON into `T`.
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "rejecting malformed JSON body");
        Error::invalid_request(format!("invalid JSON body: {err}"))
    })
}
