//! HttpBackend against the bundled REST router.

use serde_json::{Value, json};
use userbase::{
    Backend, Pagination, Payload, User,
    backend::{BackendError, HttpBackend, HttpBackendConfig},
    service::USERS_PATH,
};

use crate::helpers::*;

fn json_of(payload: Payload) -> Value {
    match payload {
        Payload::Envelope(envelope) => {
            assert!((200..300).contains(&envelope.status));
            envelope.json().expect("Failed to decode envelope")
        }
        Payload::Value(_) => panic!("HTTP backend should return envelopes"),
    }
}

#[tokio::test]
async fn test_crud_round_trip() {
    let store = test_store();
    let backend = http_backend(store.clone()).await;

    let body = json!({ "username": "h", "email": "h@x.com", "password": "pw", "owner": ADMIN });
    let created = json_of(backend.push(USERS_PATH, body.to_string()).await.unwrap());
    let id = created["id"].as_str().expect("id assigned").to_string();
    assert_eq!(store.len(USERS_PATH), 1);

    let fetched = json_of(backend.get_by_id(USERS_PATH, &id).await.unwrap());
    assert_eq!(fetched["username"], "h");

    let mut user = User::from_raw(&fetched);
    user.active = true;
    let updated = json_of(backend.set(USERS_PATH, &id, &user).await.unwrap());
    assert_eq!(updated["active"], true);

    json_of(backend.remove(USERS_PATH, &id).await.unwrap());
    assert!(store.is_empty(USERS_PATH));
}

#[tokio::test]
async fn test_pagination_reaches_server() {
    let store = test_store();
    seed_users(&store, 7);
    let backend = http_backend(store).await;

    let page = Pagination::page(3, 3);
    let listed = json_of(backend.load(USERS_PATH, Some(&page)).await.unwrap());
    assert_eq!(listed, json!([store_entry(6)]));
}

fn store_entry(i: usize) -> Value {
    json!({
        "id": format!("id-{i}"),
        "username": format!("user{i}"),
        "email": format!("user{i}@example.com"),
        "active": i % 2 == 0,
    })
}

#[tokio::test]
async fn test_missing_record_maps_to_not_found() {
    let backend = http_backend(test_store()).await;

    let err = backend.get_by_id(USERS_PATH, "ghost").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        userbase::Error::Backend(BackendError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_body_maps_to_bad_request() {
    let backend = http_backend(test_store()).await;

    let err = backend
        .push(USERS_PATH, "not json".to_string())
        .await
        .unwrap_err();
    match err {
        userbase::Error::Backend(BackendError::Status { status, .. }) => assert_eq!(status, 400),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    // Bind then drop a listener to find a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = HttpBackendConfig::new(&format!("http://{addr}")).unwrap();
    let backend = HttpBackend::new(config).unwrap();

    let err = backend.load(USERS_PATH, None).await.unwrap_err();
    match err {
        userbase::Error::Backend(err) => assert!(err.is_transport_error()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_health_route() {
    let addr = spawn_server(test_store()).await;

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_service_over_http_decodes_envelopes() {
    let store = test_store();
    seed_users(&store, 2);
    let service = test_service(std::sync::Arc::new(http_backend(store).await));

    service.load(None).await.unwrap();
    assert_eq!(service.count(), 2);

    let raw = service.get("id-1").await.unwrap();
    assert_eq!(raw["email"], "user1@example.com");
}
