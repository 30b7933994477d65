use axum::extract::FromRef;
use std::sync::Arc;

use crate::bookmarks::BookmarkService;
use crate::config::AuthConfig;
use crate::health::HealthManager;
use crate::services::BookmarkStore;

/// Everything the handlers need, passed explicitly instead of held globally
#[derive(Clone, FromRef)]
pub struct AppState {
    pub bookmarks: BookmarkService,
    pub health: HealthManager,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn BookmarkStore>, auth: AuthConfig) -> Self {
        Self {
            bookmarks: BookmarkService::new(Arc::clone(&store)),
            health: HealthManager::new().with_store(store),
            auth: Arc::new(auth),
        }
    }
}
