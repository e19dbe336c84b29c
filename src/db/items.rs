use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{AssetItemChanges, AssetItemModel, NewAssetItem};

/// Persistence primitives for asset items.
///
/// Uniqueness of `external_code` and `qr_code` is enforced here; a collision
/// surfaces as [`AppError::ConstraintViolation`] naming the constraint.
#[async_trait]
pub trait AssetItemStore: Send + Sync {
    async fn create(&self, item: NewAssetItem) -> AppResult<AssetItemModel>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssetItemModel>>;

    async fn find_by_qr_code(&self, qr_code: &str) -> AppResult<Option<AssetItemModel>>;

    async fn find_by_external_code(&self, code: &str) -> AppResult<Option<AssetItemModel>>;

    /// Direct children of `parent_id`, or top-level items when `None`.
    async fn list_children(&self, parent_id: Option<&str>) -> AppResult<Vec<AssetItemModel>>;

    /// Applies `changes` in a single write. Fails with `NotFound` for an unknown id.
    ///
    /// When `changes` sets `decommission_date` on an item that is already
    /// decommissioned, nothing is written and `AlreadyDecommissioned` is returned.
    async fn update(&self, id: &str, changes: AssetItemChanges) -> AppResult<AssetItemModel>;

    async fn set_parent(&self, id: &str, parent_id: Option<&str>) -> AppResult<AssetItemModel>;
}

const ITEM_COLUMNS: &str = "id::text, external_code, parent_id::text, name, sequence_number, qr_code, \
     acquisition_date, last_inventory_date, decommission_date, notes, \
     created_at::text, updated_at::text";

/// PostgreSQL-backed store over the `asset_items` table.
#[derive(Clone)]
pub struct PgAssetItemStore {
    pool: PgPool,
}

impl PgAssetItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AssetItemStore for PgAssetItemStore {
    async fn create(&self, item: NewAssetItem) -> AppResult<AssetItemModel> {
        let model: AssetItemModel = sqlx::query_as(&format!(
            "INSERT INTO asset_items (external_code, parent_id, name, sequence_number, qr_code, acquisition_date) \
             VALUES ($1, $2::uuid, $3, $4, $5, $6) \
             RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(&item.external_code)
        .bind(item.parent_id.as_deref())
        .bind(&item.name)
        .bind(item.sequence_number)
        .bind(&item.qr_code)
        .bind(item.acquisition_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(model)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssetItemModel>> {
        if uuid::Uuid::parse_str(id).is_err() {
            return Ok(None);
        }

        let model: Option<AssetItemModel> = sqlx::query_as(&format!(
            "SELECT {} FROM asset_items WHERE id = $1::uuid",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> AppResult<Option<AssetItemModel>> {
        // md5() lets the lookup use the unique index
        let model: Option<AssetItemModel> = sqlx::query_as(&format!(
            "SELECT {} FROM asset_items WHERE md5(qr_code) = md5($1) AND qr_code = $1 LIMIT 1",
            ITEM_COLUMNS
        ))
        .bind(qr_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    async fn find_by_external_code(&self, code: &str) -> AppResult<Option<AssetItemModel>> {
        let model: Option<AssetItemModel> = sqlx::query_as(&format!(
            "SELECT {} FROM asset_items WHERE external_code = $1",
            ITEM_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    async fn list_children(&self, parent_id: Option<&str>) -> AppResult<Vec<AssetItemModel>> {
        let models: Vec<AssetItemModel> = match parent_id {
            // No item can have a non-UUID parent
            Some(parent) if uuid::Uuid::parse_str(parent).is_err() => Vec::new(),
            Some(parent) => {
                sqlx::query_as(&format!(
                    "SELECT {} FROM asset_items WHERE parent_id = $1::uuid \
                     ORDER BY name ASC, created_at ASC",
                    ITEM_COLUMNS
                ))
                .bind(parent)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {} FROM asset_items WHERE parent_id IS NULL \
                     ORDER BY name ASC, created_at ASC",
                    ITEM_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(models)
    }

    async fn update(&self, id: &str, changes: AssetItemChanges) -> AppResult<AssetItemModel> {
        if uuid::Uuid::parse_str(id).is_err() {
            return Err(AppError::NotFound(format!("Item {} not found", id)));
        }

        // A decommissioning write only matches rows that are still active
        let model: Option<AssetItemModel> = sqlx::query_as(&format!(
            "UPDATE asset_items SET \
             last_inventory_date = COALESCE($2, last_inventory_date), \
             decommission_date = COALESCE(decommission_date, $3), \
             notes = CASE \
                 WHEN $4::text IS NULL THEN notes \
                 WHEN notes IS NULL OR notes = '' THEN $4::text \
                 ELSE notes || E'\\n' || $4::text \
             END, \
             updated_at = NOW() \
             WHERE id = $1::uuid AND ($3::date IS NULL OR decommission_date IS NULL) \
             RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(changes.last_inventory_date)
        .bind(changes.decommission_date)
        .bind(changes.append_note.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        match model {
            Some(m) => Ok(m),
            None => match self.find_by_id(id).await? {
                Some(current) => match current.decommission_date {
                    Some(date) => Err(AppError::AlreadyDecommissioned {
                        name: current.name,
                        date,
                    }),
                    None => Err(AppError::Internal(format!(
                        "Update of item {} matched no row",
                        id
                    ))),
                },
                None => Err(AppError::NotFound(format!("Item {} not found", id))),
            },
        }
    }

    async fn set_parent(&self, id: &str, parent_id: Option<&str>) -> AppResult<AssetItemModel> {
        if uuid::Uuid::parse_str(id).is_err() {
            return Err(AppError::NotFound(format!("Item {} not found", id)));
        }
        if let Some(parent) = parent_id {
            if uuid::Uuid::parse_str(parent).is_err() {
                return Err(AppError::InvalidInput(format!(
                    "parent id {} is not a valid item id",
                    parent
                )));
            }
        }

        let model: Option<AssetItemModel> = sqlx::query_as(&format!(
            "UPDATE asset_items SET parent_id = $1::uuid, updated_at = NOW() \
             WHERE id = $2::uuid \
             RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(parent_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        model.ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
    }
}
