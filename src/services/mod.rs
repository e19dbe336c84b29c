pub mod create_items;
pub mod decommission;
pub mod hierarchy;
pub mod inventory;

#[cfg(feature = "grpc")]
pub mod health_service;
#[cfg(feature = "grpc")]
pub mod items_service;

pub use create_items::{BatchFailure, CreateItemsOutcome, CreateItemsRequest};
pub use decommission::{DecommissionOutcome, DecommissionRequest};
pub use inventory::{InventoryOutcome, InventoryRequest};

#[cfg(feature = "grpc")]
pub use health_service::HealthServiceImpl;
#[cfg(feature = "grpc")]
pub use items_service::AssetItemsServiceImpl;

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::codes::{ItemCodeGenerator, DEFAULT_ITEM_CODE_PREFIX};
use crate::db::AssetItemStore;
use crate::error::{AppError, AppResult};
use crate::maintenance::MaintenanceDesk;
use crate::models::AssetItemModel;
use crate::qr::{PngQrEncoder, QrEncoder};

/// Tunables for the item workflows.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub item_code_prefix: String,
    /// Create attempts per item when the minted code collides
    pub item_code_attempts: u32,
    pub max_batch_size: i64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            item_code_prefix: DEFAULT_ITEM_CODE_PREFIX.to_string(),
            item_code_attempts: 3,
            max_batch_size: 500,
        }
    }
}

/// Bulk creation, inventory check-in, decommissioning and hierarchy
/// maintenance over an [`AssetItemStore`].
#[derive(Clone)]
pub struct AssetItemsService {
    store: Arc<dyn AssetItemStore>,
    encoder: Arc<dyn QrEncoder>,
    maintenance: Option<Arc<dyn MaintenanceDesk>>,
    clock: Arc<dyn Clock>,
    codes: ItemCodeGenerator,
    settings: WorkflowSettings,
}

impl AssetItemsService {
    pub fn new(store: Arc<dyn AssetItemStore>) -> Self {
        Self {
            store,
            encoder: Arc::new(PngQrEncoder::default()),
            maintenance: None,
            clock: Arc::new(SystemClock),
            codes: ItemCodeGenerator::default(),
            settings: WorkflowSettings::default(),
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn QrEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_maintenance_desk(mut self, desk: Arc<dyn MaintenanceDesk>) -> Self {
        self.maintenance = Some(desk);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.codes = ItemCodeGenerator::new(settings.item_code_prefix.clone());
        self.settings = settings;
        self
    }

    pub async fn get_item(&self, id: &str) -> AppResult<AssetItemModel> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
    }

    /// Resolves a scanned value to an item.
    ///
    /// The value is matched against the stored QR payload first, then against
    /// the external code, which is what a scanner decodes from a printed label.
    pub async fn find_by_scanned_code(&self, scanned: &str) -> AppResult<Option<AssetItemModel>> {
        let scanned = scanned.trim();
        if scanned.is_empty() {
            return Err(AppError::InvalidInput("qr_code is required".to_string()));
        }

        if let Some(item) = self.store.find_by_qr_code(scanned).await? {
            return Ok(Some(item));
        }
        self.store.find_by_external_code(scanned).await
    }

    async fn require_scanned(&self, scanned: &str) -> AppResult<AssetItemModel> {
        self.find_by_scanned_code(scanned).await?.ok_or_else(|| {
            AppError::NotFound(format!("No item found for QR code: {}", scanned.trim()))
        })
    }
}
