use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use userbase::{
    Backend, UserService,
    backend::{HttpBackend, HttpBackendConfig, InMemory},
    dispatch::Inline,
    server,
    service::USERS_PATH,
};

/// The authenticated user every test backend reports.
pub const ADMIN: &str = "admin";

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Creates an empty in-memory store acting as the source of truth.
pub fn test_store() -> Arc<InMemory> {
    Arc::new(InMemory::new().with_user_id(ADMIN))
}

/// Creates the backend a service under test talks to, wrapping `store`.
///
/// Selected by the TEST_BACKEND env var:
/// - "inmemory" or unset: `store` itself
/// - "http": an `HttpBackend` talking to a REST router over `store`
///
/// ```bash
/// TEST_BACKEND=http cargo test
/// ```
pub async fn test_backend(store: Arc<InMemory>) -> Arc<dyn Backend> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("http") => Arc::new(http_backend(store).await) as Arc<dyn Backend>,
        Ok("inmemory") | Ok("") | Err(_) => store as Arc<dyn Backend>,
        Ok(other) => panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, http"),
    }
}

/// Serves `backend` on an ephemeral local port, returning its address.
///
/// The server task lives until the test runtime shuts down.
pub async fn spawn_server(backend: Arc<dyn Backend>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, server::router(backend))
            .await
            .expect("Test server failed");
    });
    addr
}

/// An `HttpBackend` talking to a freshly spawned server over `store`.
pub async fn http_backend(store: Arc<InMemory>) -> HttpBackend {
    let addr = spawn_server(store).await;
    let config = HttpBackendConfig::new(&format!("http://{addr}"))
        .expect("Failed to build config")
        .with_user_id(ADMIN);
    HttpBackend::new(config).expect("Failed to build HTTP backend")
}

/// A service over `backend` that publishes inline.
pub fn test_service(backend: Arc<dyn Backend>) -> UserService {
    UserService::new(backend, Arc::new(Inline))
}

/// Seeds `store` with `count` users named user0, user1, ...
pub fn seed_users(store: &InMemory, count: usize) {
    store.seed(
        USERS_PATH,
        (0..count).map(|i| {
            json!({
                "id": format!("id-{i}"),
                "username": format!("user{i}"),
                "email": format!("user{i}@example.com"),
                "active": i % 2 == 0,
            })
        }),
    );
}

/// Store, service and backend wired together.
pub async fn setup(count: usize) -> (Arc<InMemory>, UserService) {
    let store = test_store();
    seed_users(&store, count);
    let backend = test_backend(store.clone()).await;
    (store, test_service(backend))
}
