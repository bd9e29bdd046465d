//! Static asset responder for unmatched authenticated `GET`s.
//!
//! Files are read through a capability handle on the static root, so a path
//! can never resolve outside it: `..` segments are rejected up front and
//! `cap-std` refuses anything (including symlinks) that would escape.

use std::io;
use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{debug, warn};

use crate::domain::Error;

use super::ApiResult;
use super::auth::Caller;
use super::state::HttpState;

/// Cookie through which the bundled map page reads its API key.
pub const MAPS_KEY_COOKIE: &str = "googleApiKey";

const INDEX_FILE: &str = "index.html";

/// Read-only view of the static root.
#[derive(Clone, Default)]
pub struct StaticAssets {
    root: Option<Arc<Dir>>,
    maps_api_key: Option<String>,
}

impl StaticAssets {
    /// Open `root` for serving.
    ///
    /// # Errors
    ///
    /// Fails when the directory does not exist or cannot be opened.
    pub fn open(root: &Utf8Path, maps_api_key: Option<String>) -> io::Result<Self> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Some(Arc::new(dir)),
            maps_api_key,
        })
    }

    /// A responder that answers every request with 404.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Read the file for a request path, or `None` when it must be a 404.
    pub async fn read(&self, request_path: &str) -> Option<Vec<u8>> {
        let dir = Arc::clone(self.root.as_ref()?);
        let relative = relative_path(request_path)?;
        let result = web::block(move || dir.read(relative.as_std_path())).await;
        match result {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(err)) => {
                debug!(path = request_path, error = %err, "static file unavailable");
                None
            }
            Err(err) => {
                warn!(path = request_path, error = %err, "static file read was cancelled");
                None
            }
        }
    }

    fn respond(&self, path: &Utf8Path, body: Vec<u8>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        builder.insert_header(content_type_for(path));
        if let Some(key) = &self.maps_api_key {
            builder.cookie(
                Cookie::build(MAPS_KEY_COOKIE, key.clone())
                    .same_site(SameSite::Strict)
                    .finish(),
            );
        }
        builder.body(body)
    }
}

/// Map a request path onto a path relative to the static root.
///
/// `/` maps to `index.html`. Returns `None` for anything containing `..`,
/// a root or drive prefix after the leading slash, or an empty segment
/// list.
pub fn relative_path(request_path: &str) -> Option<Utf8PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(Utf8PathBuf::from(INDEX_FILE));
    }
    let mut relative = Utf8PathBuf::new();
    for component in Utf8Path::new(trimmed).components() {
        match component {
            Utf8Component::Normal(segment) if !segment.contains('\\') => relative.push(segment),
            Utf8Component::CurDir => {}
            _ => return None,
        }
    }
    (!relative.as_str().is_empty()).then_some(relative)
}

/// `Content-Type` derived from the file extension.
pub fn content_type_for(path: &Utf8Path) -> ContentType {
    let mime = match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "text/plain; charset=utf-8",
    };
    match mime.parse() {
        Ok(parsed) => ContentType(parsed),
        Err(_) => ContentType::plaintext(),
    }
}

/// Fallback for every request no endpoint claimed.
///
/// Authenticated `GET`s are served from the static root; everything else is
/// a 404.
pub async fn fallback(
    _caller: Caller,
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    if req.method() != actix_web::http::Method::GET {
        return Err(Error::not_found("Not found"));
    }
    // Percent-decoded by the router; `/`, `%` and `+` stay encoded.
    let path = req.match_info().as_str();
    let Some(body) = state.assets.read(path).await else {
        return Err(Error::not_found("Not found"));
    };
    let served = relative_path(path).unwrap_or_else(|| Utf8PathBuf::from(INDEX_FILE));
    Ok(state.assets.respond(&served, body))
}
