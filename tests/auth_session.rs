mod common;

use std::sync::Arc;

use common::mock_backend::{MockBackend, MockResponse};
use common::{api_config, device, device_json};
use device_inventory::api::{ApiClient, DeviceApi, DeviceClient, SessionStore};
use device_inventory::storage::{FileStore, KeyValueStore};
use serde_json::json;
use tempfile::TempDir;

fn auth_response(token: &str) -> MockResponse {
    MockResponse::data(json!({
        "user": {"id": 7, "name": "Ana", "email": "ana@example.com"},
        "token": token,
        "token_type": "Bearer"
    }))
}

#[tokio::test]
async fn test_login_adopts_token_for_later_requests() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(auth_response("tok-42")).await;
    backend
        .enqueue_response(MockResponse::data(device_json(&device(1, "Laptop", "Lab A", false))))
        .await;

    let api = ApiClient::new(&api_config(&backend.base_url())).unwrap();
    let session = api.login("ana@example.com", "hunter22").await.unwrap();

    assert_eq!(session.user.id, 7);
    assert_eq!(session.token.expose(), "tok-42");
    assert!(api.has_token());

    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/login");
    assert_eq!(
        requests[0].json_body(),
        json!({"email": "ana@example.com", "password": "hunter22"})
    );

    let devices = DeviceClient::new(api.clone(), "devices");
    devices.get(1).await.unwrap();
    assert_eq!(
        backend.last_request().await.header("authorization"),
        Some("Bearer tok-42")
    );
}

#[tokio::test]
async fn test_register_confirms_password() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(auth_response("tok-new")).await;

    let api = ApiClient::new(&api_config(&backend.base_url())).unwrap();
    api.register("Ana", "ana@example.com", "hunter22", "hunter22")
        .await
        .unwrap();

    let req = backend.last_request().await;
    assert_eq!(req.path, "/api/register");
    assert_eq!(req.json_body()["password_confirmation"], "hunter22");
}

#[tokio::test]
async fn test_register_mismatch_is_rejected_locally() {
    let backend = MockBackend::start().await;
    let api = ApiClient::new(&api_config(&backend.base_url())).unwrap();

    let err = api
        .register("Ana", "ana@example.com", "hunter22", "hunter23")
        .await
        .unwrap_err();
    assert!(err
        .field_errors()
        .unwrap()
        .contains_key("password_confirmation"));

    let err = api
        .register("Ana", "ana@example.com", "abc", "abc")
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains_key("password"));

    assert!(backend.captured_requests().await.is_empty());
    assert!(!api.has_token());
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(401, "Invalid credentials"))
        .await;

    let api = ApiClient::new(&api_config(&backend.base_url())).unwrap();
    let err = api.login("ana@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.error_type(), "unauthorized");
    assert!(err.to_string().contains("Invalid credentials"));
    assert!(!api.has_token());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(auth_response("tok-disk")).await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    {
        let api = ApiClient::new(&api_config(&backend.base_url())).unwrap();
        let session = api.login("ana@example.com", "hunter22").await.unwrap();
        SessionStore::new(Arc::new(FileStore::new(&path)))
            .save(&session)
            .unwrap();
    }

    let sessions = SessionStore::new(Arc::new(FileStore::new(&path)));
    assert_eq!(sessions.load_token().unwrap().unwrap().expose(), "tok-disk");
    assert_eq!(sessions.load_user().unwrap().unwrap().email, "ana@example.com");

    sessions.clear().unwrap();
    let storage = FileStore::new(&path);
    assert!(storage.get("token").unwrap().is_none());
    assert!(storage.get("user").unwrap().is_none());
}

#[test]
fn test_token_is_masked_in_debug() {
    let session_token = device_inventory::api::SecureString::new("tok-secret");
    assert!(!format!("{:?}", session_token).contains("tok-secret"));
    assert!(!format!("{}", session_token).contains("tok-secret"));
}
