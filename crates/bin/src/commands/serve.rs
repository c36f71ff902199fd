//! Serve command - runs a development REST server over an in-memory store.

use std::{path::Path, sync::Arc};

use tokio::signal::unix::{SignalKind, signal};
use userbase::{
    SystemClock,
    backend::{Backend, InMemory},
    server,
};

use crate::cli::ServeArgs;

/// Run the Userbase development server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(open_store(args.data_file.as_deref()).await);

    let app = server::router(store.clone() as Arc<dyn Backend>);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Userbase server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET    /health                 - Health check");
    println!("  GET    /{{collection}}           - List records (?page, perPage, sort)");
    println!("  POST   /{{collection}}           - Create a record");
    println!("  GET    /{{collection}}/{{id}}      - Fetch a record");
    println!("  PUT    /{{collection}}/{{id}}      - Update a record");
    println!("  DELETE /{{collection}}/{{id}}      - Delete a record");
    println!();
    println!("Press Ctrl+C to shutdown");

    let data_file = args.data_file.clone();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown().await;

            if let Some(path) = data_file {
                match store.save_to_file(&path).await {
                    Ok(()) => {
                        tracing::info!("Store saved to {}", path.display());
                        println!("\nStore saved successfully");
                    }
                    Err(e) => {
                        tracing::error!("Failed to save store: {e:?}");
                        eprintln!("Failed to save store: {e}");
                    }
                }
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

/// Load the store from `data_file`, falling back to an empty one.
async fn open_store(data_file: Option<&Path>) -> InMemory {
    let Some(path) = data_file else {
        return InMemory::new();
    };
    if !path.exists() {
        tracing::info!("No store at {}; starting empty", path.display());
        return InMemory::new();
    }
    match InMemory::load_from_file(path, Arc::new(SystemClock)).await {
        Ok(store) => {
            tracing::info!("Loaded store from {}", path.display());
            store
        }
        Err(e) => {
            tracing::warn!("Failed to load store: {e:?}. Creating a new one.");
            InMemory::new()
        }
    }
}

/// Resolve on SIGTERM or SIGINT.
async fn wait_for_shutdown() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Failed to install signal handlers ({e}); falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;
    use userbase::service::USERS_PATH;

    use super::*;

    #[tokio::test]
    async fn test_open_store_without_file_is_empty() {
        let store = open_store(None).await;
        assert!(store.is_empty(USERS_PATH));
    }

    #[tokio::test]
    async fn test_open_store_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        let store = open_store(Some(&path)).await;
        assert!(store.is_empty(USERS_PATH));
    }

    #[tokio::test]
    async fn test_open_store_reads_saved_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        let original = InMemory::new();
        original.seed(USERS_PATH, [json!({ "id": "u1", "username": "ana" })]);
        original.save_to_file(&path).await.unwrap();

        let store = open_store(Some(&path)).await;
        assert_eq!(store.len(USERS_PATH), 1);
    }
}
