//! Shared helpers for the HTTP-level tests: bookmark fixtures and a server
//! bound to an ephemeral port with its own SQLite store.

#![allow(dead_code)]

use bookmarks_api::config::AuthConfig;
use bookmarks_api::schema::NewBookmark;
use bookmarks_api::server::{AppState, serve};
use bookmarks_api::services::{BookmarkStore, SqliteBookmarkStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const API_TOKEN: &str = "integration-test-token";

/// Bookmarks seeded for the "given there are bookmarks" cases, shared
/// with the router tests in `src/tests/`
pub fn make_bookmarks_array() -> Vec<NewBookmark> {
    serde_json::from_str(include_str!("../fixtures/bookmarks.json")).expect("fixture bookmarks")
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<SqliteBookmarkStore>,
    pub client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Bind an ephemeral port and serve a fresh in-memory store
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let store = Arc::new(SqliteBookmarkStore::open("sqlite::memory:").expect("open store"));
        let state = AppState::new(store.clone(), AuthConfig::new(API_TOKEN));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            state,
            async move {
                let _ = shutdown_rx.await;
            },
            Duration::from_secs(5),
        ));

        Self {
            addr,
            store,
            client: reqwest::Client::new(),
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    pub async fn seed(&self, bookmarks: Vec<NewBookmark>) {
        self.store.insert_many(bookmarks).await.expect("seed bookmarks");
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Authorized GET
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(API_TOKEN)
            .send()
            .await
            .expect("request succeeds")
    }

    /// Empty the table and stop the server, waiting for it to drain
    pub async fn teardown(mut self) -> anyhow::Result<()> {
        self.store.truncate().await?;
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.await?
    }
}
