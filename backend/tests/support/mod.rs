//! Shared helpers for HTTP and storage integration tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;
use actix_web::{App, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use grouptrack::Trace;
use grouptrack::domain::ports::{Storage, StoragePorts};
use grouptrack::domain::{AccessService, ClockConfig, FriendGroup, TrackingService, Username};
use grouptrack::inbound::http::{HttpState, StaticAssets, configure};
use grouptrack::outbound::file_store::JsonFileStorage;

/// A file-backed deployment rooted in a temporary directory.
///
/// Layout: `<tmp>/data` holds the JSON documents and `<tmp>/static` the
/// assets, so `<tmp>/secret.txt` sits just outside the static root.
pub struct FileDeployment {
    pub tmp: TempDir,
    pub ports: StoragePorts,
}

impl FileDeployment {
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = utf8_root(&tmp);
        std::fs::create_dir_all(root.join("static")).expect("static dir");
        std::fs::write(root.join("static/index.html"), "<h1>clock</h1>").expect("index");
        std::fs::write(root.join("secret.txt"), "keep out").expect("secret");
        let storage = Arc::new(JsonFileStorage::new(root.join("data")));
        storage.initialize().await.expect("initialise storage");
        Self {
            tmp,
            ports: StoragePorts::from_backend(storage),
        }
    }

    pub fn root(&self) -> Utf8PathBuf {
        utf8_root(&self.tmp)
    }

    /// Provision `username` in `group` awaiting first login.
    pub async fn provision(&self, username: &str, group: &str) {
        self.ports
            .credentials
            .create_user(
                &Username::new(username).expect("username"),
                &FriendGroup::new(group).expect("group"),
            )
            .await
            .expect("create user");
    }

    /// HTTP state wired exactly as the server wires it.
    pub fn http_state(&self, clock: ClockConfig) -> web::Data<HttpState> {
        let assets = StaticAssets::open(&self.root().join("static"), Some("maps-key".to_owned()))
            .expect("open static root");
        web::Data::new(HttpState::new(
            Arc::new(AccessService::new(self.ports.credentials.clone())),
            Arc::new(TrackingService::new(
                self.ports.locations.clone(),
                self.ports.geofences.clone(),
                clock,
            )),
            assets,
        ))
    }
}

/// The server's app over `state`; pass it to `test::init_service`.
pub fn tracking_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).wrap(Trace).configure(configure)
}

fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8Path::from_path(tmp.path())
        .expect("utf-8 tempdir")
        .to_path_buf()
}

/// Attach `Authorization: Basic` for `username:password`.
pub fn basic(req: TestRequest, username: &str, password: &str) -> TestRequest {
    req.insert_header((
        AUTHORIZATION,
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
    ))
}
