pub mod items;
pub mod memory;
pub mod pool;

pub use items::{AssetItemStore, PgAssetItemStore};
pub use memory::MemoryAssetItemStore;
pub use pool::{create_pool, run_migrations};

/// Unique constraint on `asset_items.external_code`.
pub const EXTERNAL_CODE_CONSTRAINT: &str = "asset_items_external_code_key";

/// Unique index on the QR payload of `asset_items`.
pub const QR_CODE_CONSTRAINT: &str = "asset_items_qr_code_key";
