#![allow(clippy::unwrap_used)]
// Integration tests for `NocClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nocmap_api::{DeviceDraft, Error, NocClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NocClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = NocClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, client)
}

fn sample_draft() -> DeviceDraft {
    DeviceDraft {
        name: "Switch Lt 2".into(),
        ip: "192.168.10.2".into(),
        device_type: "switch".into(),
        floor_id: "floor_2".into(),
        pos_top: 25.0,
        pos_left: 40.5,
        is_active: true,
    }
}

// ── Dashboard API ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_config() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floor_maps": {"ground": "static/maps/denah_lt0.jpg", "floor_1": "static/maps/denah_lt1.jpg"},
            "floor_labels": {"ground": "Ground Floor", "floor_1": "Lantai 1"},
            "device_types": {"switch": {"label": "Switch"}, "cctv": {"label": "CCTV"}}
        })))
        .mount(&server)
        .await;

    let config = client.get_config().await.unwrap();
    assert_eq!(config.floor_maps.len(), 2);
    assert_eq!(config.floor_labels["floor_1"], "Lantai 1");
    assert_eq!(
        config.device_types.keys().collect::<Vec<_>>(),
        vec!["switch", "cctv"]
    );
}

#[tokio::test]
async fn test_incomplete_config_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "floor_maps": {"ground": "a.jpg"},
            "floor_labels": {"ground": "Ground"}
        })))
        .mount(&server)
        .await;

    let result = client.get_config().await;
    assert!(
        matches!(result, Err(Error::IncompleteConfig { missing: "device_types" })),
        "expected IncompleteConfig, got: {result:?}"
    );
}

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [{
                "id": "192_168_20_1",
                "name": "CCTV FTI120",
                "ip": "192.168.20.1",
                "type": "cctv",
                "floor_id": "floor_1",
                "position": {"top": "64.3%", "left": "64.8%"},
                "online": false
            }],
            "global": {"total": 1, "online": 0, "offline": 1},
            "timestamp": "2026-01-05 08:00:00",
            "status": "ok"
        })))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();
    assert_eq!(status.devices.len(), 1);
    assert_eq!(status.devices[0].online, Some(false));
    assert_eq!(status.global.unwrap().offline, 1);
}

#[tokio::test]
async fn test_status_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "lock timeout", "status": "error"})),
        )
        .mount(&server)
        .await;

    let err = client.get_status().await.unwrap_err();
    match &err {
        Error::Api { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "lock timeout");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_get_logs_and_health() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [
                {"timestamp": "2026-01-05 08:00:01", "device": "AP 1", "status": "Offline", "message": "AP 1 went Offline"},
                {"timestamp": "2026-01-05 07:59:00", "device": "AP 1", "status": "Online", "message": "AP 1 went Online"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "timestamp": "2026-01-05 08:00:02",
            "devices_tracked": 42,
            "devices_with_status": 40
        })))
        .mount(&server)
        .await;

    let logs = client.get_logs().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].status, "Offline");
    assert_eq!(logs[0].device.as_deref(), Some("AP 1"));

    let health = client.health().await.unwrap();
    assert_eq!(health.devices_tracked, 42);
    assert_eq!(health.devices_with_status, 40);
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_string_contains("username=admin"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/")
                .insert_header("Set-Cookie", "session=abc123; Path=/"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/devices"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "s3cret".to_string().into();
    client.login("admin", &secret).await.unwrap();
    assert_eq!(client.cookie_header().as_deref(), Some("session=abc123"));

    let devices = client.list_devices().await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("Login gagal: Username atau password salah."),
        )
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_admin_redirect_to_login_is_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/devices"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/auth/login"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form></form>"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(err.is_auth_expired(), "expected auth error, got: {err:?}");
}

// ── Admin device CRUD ───────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "name": "AP Lobby", "ip": "10.0.0.9", "type": "wifi",
             "floor_id": "ground", "pos_top": 12.5, "pos_left": 80.0, "is_active": true},
            {"id": 1, "name": "Core", "ip": "10.0.0.1", "type": "switch",
             "floor_id": "ground", "pos_top": 50.0, "pos_left": 50.0, "is_active": false}
        ])))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, 2);
    assert_eq!(devices[0].device_type, "wifi");
    assert!(!devices[1].is_active);
}

#[tokio::test]
async fn test_create_device() {
    let (server, client) = setup().await;
    let draft = sample_draft();

    Mock::given(method("POST"))
        .and(path("/admin/api/devices"))
        .and(body_json(json!({
            "name": "Switch Lt 2",
            "ip": "192.168.10.2",
            "type": "switch",
            "floor_id": "floor_2",
            "pos_top": 25.0,
            "pos_left": 40.5,
            "is_active": true
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"message": "Device berhasil ditambahkan", "id": 17})),
        )
        .mount(&server)
        .await;

    let resp = client.create_device(&draft).await.unwrap();
    assert_eq!(resp.id, Some(17));
}

#[tokio::test]
async fn test_create_device_validation_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/devices"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Data tidak lengkap"})),
        )
        .mount(&server)
        .await;

    let err = client.create_device(&sample_draft()).await.unwrap_err();
    assert!(
        matches!(&err, Error::Api { status: 400, message } if message == "Data tidak lengkap"),
        "unexpected error: {err:?}"
    );
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_update_and_get_device() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/devices/5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Device berhasil diupdate"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/devices/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "Switch Lt 2", "ip": "192.168.10.2", "type": "switch",
            "floor_id": "floor_2", "pos_top": 25.0, "pos_left": 40.5, "is_active": true
        })))
        .mount(&server)
        .await;

    let resp = client.update_device(5, &sample_draft()).await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("Device berhasil diupdate"));

    let device = client.get_device(5).await.unwrap();
    assert_eq!(device.floor_id, "floor_2");
}

#[tokio::test]
async fn test_delete_missing_device() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/admin/api/devices/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Device tidak ditemukan"})),
        )
        .mount(&server)
        .await;

    let err = client.delete_device(99).await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}
