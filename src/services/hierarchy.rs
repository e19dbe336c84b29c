use std::collections::HashSet;

use super::AssetItemsService;
use crate::error::{AppError, AppResult};
use crate::models::AssetItemModel;

impl AssetItemsService {
    /// Components of `parent_id`, or top-level items when `None`.
    pub async fn list_components(&self, parent_id: Option<&str>) -> AppResult<Vec<AssetItemModel>> {
        self.store.list_children(parent_id).await
    }

    /// Parent chain of an item, nearest first.
    ///
    /// Stops with `HierarchyCycle` if the stored links loop back on themselves.
    pub async fn ancestors(&self, id: &str) -> AppResult<Vec<AssetItemModel>> {
        let item = self.get_item(id).await?;
        let mut visited = HashSet::from([item.id.clone()]);
        let mut chain = Vec::new();
        let mut next = item.parent_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id.clone()) {
                return Err(AppError::HierarchyCycle {
                    item_id: id.to_string(),
                    parent_id,
                });
            }
            let parent = self.store.find_by_id(&parent_id).await?.ok_or_else(|| {
                AppError::Internal(format!("Dangling parent reference {}", parent_id))
            })?;
            next = parent.parent_id.clone();
            chain.push(parent);
        }

        Ok(chain)
    }

    /// Re-parents an item. The new parent may not be the item itself or any
    /// of its descendants.
    pub async fn move_item(&self, id: &str, new_parent_id: Option<&str>) -> AppResult<AssetItemModel> {
        let item = self.get_item(id).await?;
        let new_parent_id = new_parent_id.map(str::trim).filter(|p| !p.is_empty());

        tracing::info!(
            "MoveItem called: id={}, new_parent_id={:?}",
            item.id,
            new_parent_id
        );

        if let Some(parent_id) = new_parent_id {
            let parent = self.get_item(parent_id).await?;
            let cycle = AppError::HierarchyCycle {
                item_id: item.id.clone(),
                parent_id: parent.id.clone(),
            };
            if parent.id == item.id {
                return Err(cycle);
            }
            let lineage = match self.ancestors(&parent.id).await {
                Ok(lineage) => lineage,
                Err(AppError::HierarchyCycle { .. }) => return Err(cycle),
                Err(e) => return Err(e),
            };
            if lineage.iter().any(|a| a.id == item.id) {
                return Err(cycle);
            }
        }

        self.store.set_parent(&item.id, new_parent_id).await
    }
}
