//! Basic-Auth extractor gating every route.
//!
//! Handlers take [`Caller`] as their first argument, so authentication runs
//! before any body is parsed or any storage other than the credential store
//! is touched.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AuthenticatedUser, BasicCredentials, Error};

use super::state::HttpState;

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub AuthenticatedUser);

impl Caller {
    /// Identity established for the request.
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }
}

fn credentials_from(req: &HttpRequest) -> Result<BasicCredentials, Error> {
    let unauthorized = || Error::unauthorized("Unauthorized");
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;
    BasicCredentials::from_header(header).map_err(|err| {
        debug!(error = %err, "rejecting malformed authorization header");
        unauthorized()
    })
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let credentials = credentials_from(req);
        Box::pin(async move {
            let credentials = credentials?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let user = state.access.authenticate(&credentials).await?;
            Ok(Self(user))
        })
    }
}
