//! End-to-end HTTP behaviour over the JSON file backend.
//!
//! Each test builds the same app the server runs, backed by a fresh data
//! directory, and drives it with real Basic credentials.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::test::{self, TestRequest};
use rstest::rstest;
use serde_json::{Value, json};

use grouptrack::domain::ports::{Storage, StoragePorts};
use grouptrack::domain::{ClockConfig, FriendGroup, LocationFix, Rect, Username};
use grouptrack::outbound::file_store::JsonFileStorage;

mod support;

use support::{FileDeployment, basic, tracking_app};

fn family_clock() -> ClockConfig {
    ClockConfig::from_json(
        r#"{
            "handFriend": ["alice", "bob", "carol"],
            "labelAngle": {"home": 90, "moving": 45, "unknown": 270, "error": 315}
        }"#,
    )
    .expect("clock config")
}

async fn family() -> FileDeployment {
    let deployment = FileDeployment::new().await;
    deployment.provision("alice", "g1").await;
    deployment.provision("bob", "g1").await;
    deployment.provision("mallory", "g2").await;
    deployment
}

fn fix(lat: f64, lon: f64, vel: u32) -> Value {
    json!({"_type": "location", "lat": lat, "lon": lon, "vel": vel, "tst": 1_700_000_000})
}

#[actix_web::test]
async fn publishing_returns_the_other_group_members() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::post().uri("/pub"), "bob", "bobpw")
        .set_json(fix(20.0, 20.0, 0))
        .to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first, json!([]));

    let req = basic(TestRequest::post().uri("/pub"), "mallory", "m")
        .set_json(fix(1.0, 1.0, 0))
        .to_request();
    test::call_service(&app, req).await;

    let req = basic(TestRequest::post().uri("/pub"), "alice", "alicepw")
        .set_json(fix(10.0, 10.0, 0))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let others = body.as_array().expect("array");
    assert_eq!(others.len(), 1, "{body}");
    assert_eq!(others[0]["tid"], json!("bob"));
    assert_eq!(others[0]["lat"], json!(20.0));
}

#[actix_web::test]
async fn non_location_messages_are_not_stored() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::post().uri("/pub"), "bob", "bobpw")
        .set_json(json!({"_type": "transition", "event": "enter"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = basic(TestRequest::post().uri("/pub"), "alice", "alicepw")
        .set_json(fix(10.0, 10.0, 0))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn first_login_binds_the_password() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::get().uri("/get-rects"), "alice", "first").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = basic(TestRequest::get().uri("/get-rects"), "alice", "second").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get(WWW_AUTHENTICATE).expect("challenge"),
        "Basic realm=\"OwnTracks\""
    );

    let req = basic(TestRequest::get().uri("/get-rects"), "alice", "first").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[rstest]
#[case(None)]
#[case(Some(("ghost", "pw")))]
#[actix_web::test]
async fn unknown_or_missing_credentials_are_rejected(#[case] credentials: Option<(&str, &str)>) {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = TestRequest::get().uri("/friend-labels");
    let req = match credentials {
        Some((username, password)) => basic(req, username, password),
        None => req,
    };
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("unauthorized"));
}

#[actix_web::test]
async fn rects_round_trip_in_order() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;
    let rects = json!([
        {"name": "city", "north": 30.0, "south": 0.0, "east": 30.0, "west": 0.0},
        {"name": "home", "north": 11.0, "south": 9.0, "east": 11.0, "west": 9.0}
    ]);

    let req = basic(TestRequest::post().uri("/update-rects"), "alice", "pw")
        .set_json(rects.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"msg": "saved successfully"}));

    let req = basic(TestRequest::get().uri("/get-rects"), "mallory", "m").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, rects);
}

#[actix_web::test]
async fn malformed_rects_are_rejected_without_writing() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::post().uri("/update-rects"), "alice", "pw")
        .insert_header(("content-type", "application/json"))
        .set_payload("[{\"name\": \"home\"")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let stored = deployment.ports.geofences.get_rects().await.expect("rects");
    assert!(stored.is_empty());
}

async fn seed_family_positions(deployment: &FileDeployment) {
    let rects: Vec<Rect> = serde_json::from_value(json!([
        {"name": "city", "north": 30.0, "south": 0.0, "east": 30.0, "west": 0.0},
        {"name": "home", "north": 11.0, "south": 9.0, "east": 11.0, "west": 9.0}
    ]))
    .expect("rects");
    deployment.ports.geofences.save_rects(&rects).await.expect("save rects");
    let g1 = FriendGroup::new("g1").expect("group");
    for (username, payload) in [("alice", fix(10.0, 10.0, 0)), ("bob", fix(10.0, 10.0, 25))] {
        let location = LocationFix::try_from(payload).expect("object");
        deployment
            .ports
            .locations
            .save_user_location(&Username::new(username).expect("username"), &g1, &location)
            .await
            .expect("save location");
    }
}

#[actix_web::test]
async fn friend_labels_use_the_smallest_enclosing_rect() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;
    seed_family_positions(&deployment).await;

    let req = basic(TestRequest::get().uri("/friend-labels"), "alice", "pw").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!([
            {"username": "alice", "label": "home"},
            {"username": "bob", "label": "moving"}
        ])
    );
}

#[actix_web::test]
async fn hand_angles_follow_the_clock_configuration() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;
    seed_family_positions(&deployment).await;

    let req = basic(TestRequest::get().uri("/hand-angles"), "bob", "pw").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([90.0, 45.0, 315.0]));
}

#[actix_web::test]
async fn static_files_are_served_to_authenticated_callers() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::get().uri("/"), "alice", "pw").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "googleApiKey")
        .expect("maps key cookie");
    assert_eq!(cookie.value(), "maps-key");
    assert_eq!(test::read_body(res).await, "<h1>clock</h1>");

    let req = TestRequest::get().uri("/").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn percent_encoded_asset_names_are_decoded() {
    let deployment = family().await;
    std::fs::write(deployment.root().join("static/my map.html"), "<p>map</p>")
        .expect("write asset");
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::get().uri("/my%20map.html"), "alice", "pw").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(test::read_body(res).await, "<p>map</p>");
}

#[actix_web::test]
async fn get_on_a_post_endpoint_is_not_served_as_index() {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::get().uri("/pub"), "alice", "pw").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::escape("/../secret.txt")]
#[case::nested_escape("/js/../../secret.txt")]
#[case::encoded_escape("/%2e%2e/secret.txt")]
#[case::missing("/missing.html")]
#[actix_web::test]
async fn unservable_paths_are_not_found(#[case] path: &str) {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let req = basic(TestRequest::get().uri(path), "alice", "pw").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::wrong_method_on_endpoint(TestRequest::delete().uri("/pub"))]
#[case::put_on_unknown_path(TestRequest::put().uri("/anything"))]
#[case::post_to_read_endpoint(TestRequest::post().uri("/hand-angles"))]
#[actix_web::test]
async fn other_routes_are_not_found(#[case] req: TestRequest) {
    let deployment = family().await;
    let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;

    let res = test::call_service(&app, basic(req, "alice", "pw").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("not_found"));
}

#[actix_web::test]
async fn bound_passwords_survive_a_restart() {
    let deployment = family().await;
    {
        let app = test::init_service(tracking_app(deployment.http_state(family_clock()))).await;
        let req = basic(TestRequest::get().uri("/get-rects"), "alice", "first").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let reopened = Arc::new(JsonFileStorage::new(deployment.root().join("data")));
    reopened.initialize().await.expect("initialise");
    let ports = StoragePorts::from_backend(reopened);
    let record = ports
        .credentials
        .get_user_credentials(&Username::new("alice").expect("username"))
        .await
        .expect("lookup")
        .expect("record");
    assert!(record.hashed_password.verify("first"));
    assert!(!record.hashed_password.verify("second"));
}
