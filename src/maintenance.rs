//! Optional maintenance-request collaborator.
//!
//! Inventory check-ins may raise a maintenance request. Deployments without a
//! maintenance backend either configure no desk at all or a desk whose
//! [`MaintenanceDesk::is_available`] returns `false`; callers ask before they
//! create anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::MaintenanceRequest;

#[async_trait]
pub trait MaintenanceDesk: Send + Sync {
    fn is_available(&self) -> bool;

    /// Files `request` and returns the id of the created request.
    async fn create_request(&self, request: MaintenanceRequest) -> AppResult<String>;
}

/// Writes requests to a `maintenance_requests` table owned by the maintenance backend.
pub struct PgMaintenanceDesk {
    pool: PgPool,
    available: bool,
}

impl PgMaintenanceDesk {
    /// Checks whether the maintenance table exists in the connected database.
    pub async fn probe(pool: PgPool) -> AppResult<Self> {
        let (table,): (Option<String>,) =
            sqlx::query_as("SELECT to_regclass('maintenance_requests')::text")
                .fetch_one(&pool)
                .await?;

        let available = table.is_some();
        if available {
            tracing::info!("Maintenance requests enabled");
        } else {
            tracing::info!("maintenance_requests table not found, maintenance requests disabled");
        }

        Ok(Self { pool, available })
    }
}

#[async_trait]
impl MaintenanceDesk for PgMaintenanceDesk {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn create_request(&self, request: MaintenanceRequest) -> AppResult<String> {
        let (id,): (String,) = sqlx::query_as(
            "INSERT INTO maintenance_requests (name, description, equipment_ref) \
             VALUES ($1, $2, $3) RETURNING id::text",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.equipment_ref.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

/// Keeps requests in memory. Availability can be toggled at runtime.
#[derive(Clone)]
pub struct MemoryMaintenanceDesk {
    available: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<(String, MaintenanceRequest)>>>,
}

impl MemoryMaintenanceDesk {
    pub fn new() -> Self {
        Self {
            available: Arc::new(AtomicBool::new(true)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unavailable() -> Self {
        let desk = Self::new();
        desk.set_available(false);
        desk
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn requests(&self) -> Vec<MaintenanceRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }
}

impl Default for MemoryMaintenanceDesk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaintenanceDesk for MemoryMaintenanceDesk {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn create_request(&self, request: MaintenanceRequest) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        self.requests.lock().await.push((id.clone(), request));
        Ok(id)
    }
}
