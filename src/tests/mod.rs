//! Shared test support and router-level tests
//!
//! The router tests drive the full middleware stack through
//! `tower::ServiceExt::oneshot`, each against its own in-memory store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::schema::{Bookmark, NewBookmark};
use crate::services::{BookmarkStore, StoreError};

pub mod bookmark_routes;

/// Bookmarks with pinned ids 1..=4, in insertion order. Shared with the
/// HTTP-level suite under `tests/`.
pub fn make_bookmarks_array() -> Vec<NewBookmark> {
    serde_json::from_str(include_str!("../../tests/fixtures/bookmarks.json"))
        .expect("fixture bookmarks")
}

pub fn attributes(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object literal")
}

/// Store whose every call fails as if the database went away
pub struct UnreachableStore;

fn gone() -> StoreError {
    StoreError::ConnectionFailed("database is gone".to_string())
}

#[async_trait]
impl BookmarkStore for UnreachableStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Err(gone())
    }

    async fn insert_many(&self, _: Vec<NewBookmark>) -> Result<Vec<Bookmark>, StoreError> {
        Err(gone())
    }

    async fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Err(gone())
    }

    async fn get(&self, _: i64) -> Result<Option<Bookmark>, StoreError> {
        Err(gone())
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        Err(gone())
    }
}

/// Empty store whose ping takes the given time
pub struct SlowStore(pub Duration);

#[async_trait]
impl BookmarkStore for SlowStore {
    async fn ping(&self) -> Result<(), StoreError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }

    async fn insert_many(&self, _: Vec<NewBookmark>) -> Result<Vec<Bookmark>, StoreError> {
        Ok(Vec::new())
    }

    async fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(Vec::new())
    }

    async fn get(&self, _: i64) -> Result<Option<Bookmark>, StoreError> {
        Ok(None)
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
