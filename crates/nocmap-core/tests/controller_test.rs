#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock NOC server.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nocmap_core::{
    Command, CommandResult, ConnectionState, Controller, ControllerConfig, CoreError, Credentials,
    DeviceDraft, DeviceStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_body() -> serde_json::Value {
    json!({
        "floor_maps": {"ground": "static/maps/lt0.jpg", "floor_1": "static/maps/lt1.jpg"},
        "floor_labels": {"ground": "Ground Floor", "floor_1": "Lantai 1"},
        "device_types": {"switch": {"label": "Switch"}, "cctv": {"label": "CCTV"}}
    })
}

fn status_body() -> serde_json::Value {
    json!({
        "devices": [
            {"id": 1, "name": "Core Switch", "ip": "10.0.0.1", "type": "switch",
             "floor_id": "ground", "position": {"top": "40%", "left": "12.5%"}, "online": true},
            {"id": 2, "name": "CCTV Lobby", "ip": "10.0.0.9", "type": "cctv",
             "floor_id": "ground", "pos_top": 10, "pos_left": 80, "status": "unstable"}
        ],
        "global": {"total": 2, "online": 1, "offline": 1},
        "timestamp": "2024-05-01 08:00:00",
        "status": "ok"
    })
}

async fn mount_dashboard(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [
                {"timestamp": "2024-05-01 07:59:00", "message": "CCTV Lobby is unstable",
                 "status": "unstable", "device": "CCTV Lobby", "type": "cctv"}
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/")
                .insert_header("Set-Cookie", "session=abc123; Path=/"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> ControllerConfig {
    let mut config = ControllerConfig::new(Url::parse(&server.uri()).unwrap());
    config.config_retry_delay = Duration::from_millis(10);
    config
}

async fn requests_to(server: &MockServer, prefix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .count()
}

fn with_admin(mut config: ControllerConfig) -> ControllerConfig {
    config.credentials = Some(Credentials {
        username: "admin".into(),
        password: SecretString::from("s3cret".to_string()),
    });
    config
}

fn draft() -> DeviceDraft {
    DeviceDraft {
        name: "AP Lt 1".into(),
        ip: "10.0.1.20".into(),
        device_type: "switch".into(),
        floor_id: "floor_1".into(),
        pos_top: 25.0,
        pos_left: 25.0,
        is_active: true,
    }
}

// ── Dashboard data ──────────────────────────────────────────────────

#[tokio::test]
async fn test_oneshot_loads_config_and_status() {
    let server = MockServer::start().await;
    mount_dashboard(&server).await;

    let snapshot = Controller::oneshot(config_for(&server), |ctrl| async move {
        let site = ctrl.site_config().unwrap();
        assert_eq!(site.floor_label("floor_1"), "Lantai 1");
        Ok(ctrl.snapshot())
    })
    .await
    .unwrap();

    assert_eq!(snapshot.devices.len(), 2);
    assert_eq!(snapshot.devices[0].status, DeviceStatus::Online);
    assert_eq!(snapshot.devices[1].status, DeviceStatus::Unstable);
    assert_eq!(snapshot.global.offline, 1);
    assert_eq!(snapshot.logs.len(), 1);
    assert_eq!(snapshot.logs[0].device.as_deref(), Some("CCTV Lobby"));
}

#[tokio::test]
async fn test_config_load_retries_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_dashboard(&server).await;

    let result = Controller::oneshot(config_for(&server), |ctrl| async move {
        Ok(ctrl.site_config().map(|s| s.floors.len()))
    })
    .await
    .unwrap();
    assert_eq!(result, Some(2));
}

#[tokio::test]
async fn test_config_load_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.config_retries = 1;
    let controller = Controller::new(config);
    let result = controller.connect().await;
    assert!(matches!(result, Err(CoreError::Api { status: Some(500), .. })));
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_status_error_body_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "monitor not running", "status": "error"})),
        )
        .mount(&server)
        .await;

    let result = Controller::oneshot(config_for(&server), |ctrl| async move {
        ctrl.refresh_status().await.map(|_| ())
    })
    .await;
    match result {
        Err(CoreError::Api { message, .. }) => assert!(message.contains("monitor not running")),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_snapshot_stream_sees_refresh() {
    let server = MockServer::start().await;
    mount_dashboard(&server).await;

    let mut config = config_for(&server);
    config.push_enabled = false;
    config.poll_interval_secs = 0;
    let controller = Controller::new(config);
    controller.connect().await.unwrap();

    let mut stream = controller.snapshots();
    assert_eq!(stream.current().devices.len(), 2);
    controller.refresh_status().await.unwrap();
    let next = stream.changed().await.unwrap();
    assert_eq!(next.global.total, 2);
    assert!(controller.store().last_update().is_some());

    controller.disconnect().await;
    assert_eq!(
        *controller.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_unavailable_falls_back_to_polling() {
    // No /socket.io route: every upgrade attempt is refused with a 404.
    let server = MockServer::start().await;
    mount_dashboard(&server).await;

    let mut config = config_for(&server);
    config.push_enabled = true;
    config.push_max_retries = Some(2);
    config.push_retry_delay = Duration::from_millis(10);
    config.poll_interval_secs = 1;
    let controller = Controller::new(config);
    controller.connect().await.unwrap();

    let mut state = controller.connection_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::Polling),
    )
    .await
    .expect("controller should fall back to polling")
    .unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while requests_to(&server, "/api/status").await < 2 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("poll task should fetch /api/status again");

    assert_eq!(requests_to(&server, "/socket.io").await, 3);

    controller.disconnect().await;
}

// ── Admin commands ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_device_via_command() {
    let server = MockServer::start().await;
    mount_dashboard(&server).await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/admin/api/devices"))
        .and(body_json(json!({
            "name": "AP Lt 1", "ip": "10.0.1.20", "type": "switch", "floor_id": "floor_1",
            "pos_top": 25.0, "pos_left": 25.0, "is_active": true
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"message": "Device berhasil ditambahkan", "id": 42})),
        )
        .mount(&server)
        .await;

    let result = Controller::oneshot(with_admin(config_for(&server)), |ctrl| async move {
        ctrl.execute(Command::CreateDevice { draft: draft() }).await
    })
    .await
    .unwrap();
    assert_eq!(result, CommandResult::Created { id: 42 });
}

#[tokio::test]
async fn test_delete_missing_device_is_not_found() {
    let server = MockServer::start().await;
    mount_dashboard(&server).await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/admin/api/devices/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Device tidak ditemukan"})),
        )
        .mount(&server)
        .await;

    let result = Controller::oneshot(with_admin(config_for(&server)), |ctrl| async move {
        ctrl.execute(Command::DeleteDevice { id: 99 }).await
    })
    .await;
    assert!(
        matches!(&result, Err(CoreError::DeviceNotFound { identifier }) if identifier == "99"),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_commands_need_credentials_and_valid_drafts() {
    let server = MockServer::start().await;
    mount_dashboard(&server).await;
    mount_login(&server).await;

    let anonymous = Controller::oneshot(config_for(&server), |ctrl| async move {
        ctrl.execute(Command::DeleteDevice { id: 1 }).await
    })
    .await;
    assert!(matches!(anonymous, Err(CoreError::AuthenticationFailed { .. })));

    let invalid = Controller::oneshot(with_admin(config_for(&server)), |ctrl| async move {
        let mut bad = draft();
        bad.name = String::new();
        ctrl.execute(Command::CreateDevice { draft: bad }).await
    })
    .await;
    assert!(matches!(invalid, Err(CoreError::ValidationFailed { .. })));
}

#[tokio::test]
async fn test_execute_before_connect_is_disconnected() {
    let server = MockServer::start().await;
    let controller = Controller::new(with_admin(config_for(&server)));
    let result = controller.execute(Command::DeleteDevice { id: 1 }).await;
    assert!(matches!(result, Err(CoreError::Disconnected)));
}
