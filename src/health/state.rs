use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::services::BookmarkStore;

/// Health status for individual services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is fully operational
    Healthy,
    /// Service is operational but with reduced capacity
    Degraded,
    /// Service is not operational
    Unhealthy,
    /// Service is still starting up
    Starting,
}

impl HealthStatus {
    /// Lower is worse
    fn priority(&self) -> u8 {
        match self {
            HealthStatus::Unhealthy => 0,
            HealthStatus::Starting => 1,
            HealthStatus::Degraded => 2,
            HealthStatus::Healthy => 3,
        }
    }
}

/// Information about a service's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub message: String,
    pub last_checked: Option<std::time::SystemTime>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status (worst of all services)
    pub status: HealthStatus,
    pub services: HashMap<String, ServiceHealth>,
    pub timestamp: std::time::SystemTime,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone)]
struct CachedHealth {
    response: HealthResponse,
    cached_at: Instant,
}

/// Health check manager with short-lived caching and an optional store probe.
///
/// Readiness reflects the API lifecycle (`mark_ready`) plus, when a store is
/// attached, the result of pinging it on each cache refresh.
#[derive(Clone)]
pub struct HealthManager {
    services: Arc<RwLock<HashMap<String, ServiceHealth>>>,
    cache: Arc<RwLock<Option<CachedHealth>>>,
    store: Option<Arc<dyn BookmarkStore>>,
    startup_time: Instant,
    cache_ttl: Duration,
    startup_grace_period: Duration,
    slow_probe_threshold: Duration,
}

impl HealthManager {
    pub fn new() -> Self {
        let mut services = HashMap::new();
        services.insert(
            "api".to_string(),
            ServiceHealth {
                status: HealthStatus::Starting,
                message: "API server starting up".to_string(),
                last_checked: Some(std::time::SystemTime::now()),
            },
        );

        Self {
            services: Arc::new(RwLock::new(services)),
            cache: Arc::new(RwLock::new(None)),
            store: None,
            startup_time: Instant::now(),
            cache_ttl: Duration::from_secs(5),
            startup_grace_period: Duration::from_secs(30),
            slow_probe_threshold: Duration::from_secs(1),
        }
    }

    /// Probe `store` whenever the cached health is refreshed
    pub fn with_store(mut self, store: Arc<dyn BookmarkStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// A store ping slower than `threshold` reports the database as degraded
    pub fn with_slow_probe_threshold(mut self, threshold: Duration) -> Self {
        self.slow_probe_threshold = threshold;
        self
    }

    /// Mark the API service as ready (called after server starts)
    pub async fn mark_ready(&self) {
        self.update_service_health("api", HealthStatus::Healthy, "API server is ready".to_string())
            .await;
        info!("API service marked as ready");
    }

    pub async fn update_service_health(&self, service_name: &str, status: HealthStatus, message: String) {
        self.services.write().await.insert(
            service_name.to_string(),
            ServiceHealth {
                status,
                message,
                last_checked: Some(std::time::SystemTime::now()),
            },
        );

        // Clear cache when status changes
        *self.cache.write().await = None;
    }

    /// Current health, served from cache while it is fresh
    pub async fn get_health(&self) -> HealthResponse {
        if let Some(cached) = &*self.cache.read().await {
            if cached.cached_at.elapsed() <= self.cache_ttl {
                return cached.response.clone();
            }
        }

        self.refresh_health().await
    }

    async fn refresh_health(&self) -> HealthResponse {
        if let Some(store) = &self.store {
            let started = Instant::now();
            let (status, message) = match store.ping().await {
                Ok(()) if started.elapsed() > self.slow_probe_threshold => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    warn!(elapsed_ms, "Bookmark store responding slowly");
                    (
                        HealthStatus::Degraded,
                        format!("Bookmark store responded in {}ms", elapsed_ms),
                    )
                }
                Ok(()) => (HealthStatus::Healthy, "Bookmark store reachable".to_string()),
                Err(err) => {
                    warn!(error = %err, "Bookmark store health probe failed");
                    (HealthStatus::Unhealthy, err.to_string())
                }
            };
            self.services.write().await.insert(
                "database".to_string(),
                ServiceHealth {
                    status,
                    message,
                    last_checked: Some(std::time::SystemTime::now()),
                },
            );
        }

        let services = self.services.read().await.clone();
        let overall_status = services
            .values()
            .map(|s| &s.status)
            .min_by_key(|status| status.priority())
            .cloned()
            .unwrap_or(HealthStatus::Healthy);

        let response = HealthResponse {
            status: overall_status,
            services,
            timestamp: std::time::SystemTime::now(),
            uptime_seconds: self.startup_time.elapsed().as_secs(),
        };

        *self.cache.write().await = Some(CachedHealth {
            response: response.clone(),
            cached_at: Instant::now(),
        });

        response
    }

    /// Check if we're still in startup grace period
    pub fn is_in_startup_period(&self) -> bool {
        self.startup_time.elapsed() < self.startup_grace_period
    }
}

impl Default for HealthManager {
    fn default() -> Self {
        Self::new()
    }
}
