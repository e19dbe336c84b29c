use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AssetItemStore, EXTERNAL_CODE_CONSTRAINT, QR_CODE_CONSTRAINT};
use crate::error::{AppError, AppResult};
use crate::models::{append_note_line, AssetItemChanges, AssetItemModel, NewAssetItem};

/// Process-local store with the same uniqueness rules as the `asset_items` table.
#[derive(Clone, Default)]
pub struct MemoryAssetItemStore {
    items: Arc<RwLock<Vec<AssetItemModel>>>,
}

impl MemoryAssetItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Snapshot of every stored item in insertion order.
    pub async fn all(&self) -> Vec<AssetItemModel> {
        self.items.read().await.clone()
    }
}

#[async_trait]
impl AssetItemStore for MemoryAssetItemStore {
    async fn create(&self, item: NewAssetItem) -> AppResult<AssetItemModel> {
        let mut items = self.items.write().await;

        if items.iter().any(|i| i.external_code == item.external_code) {
            return Err(AppError::ConstraintViolation(EXTERNAL_CODE_CONSTRAINT.to_string()));
        }
        if items.iter().any(|i| i.qr_code == item.qr_code) {
            return Err(AppError::ConstraintViolation(QR_CODE_CONSTRAINT.to_string()));
        }
        if let Some(parent) = item.parent_id.as_deref() {
            if !items.iter().any(|i| i.id == parent) {
                return Err(AppError::InvalidInput(format!(
                    "referenced record does not exist ({})",
                    parent
                )));
            }
        }

        let now = Utc::now().to_rfc3339();
        let model = AssetItemModel {
            id: Uuid::new_v4().to_string(),
            external_code: item.external_code,
            parent_id: item.parent_id,
            name: item.name,
            sequence_number: item.sequence_number,
            qr_code: item.qr_code,
            acquisition_date: item.acquisition_date,
            last_inventory_date: None,
            decommission_date: None,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
        };
        items.push(model.clone());

        Ok(model)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssetItemModel>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> AppResult<Option<AssetItemModel>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.qr_code == qr_code).cloned())
    }

    async fn find_by_external_code(&self, code: &str) -> AppResult<Option<AssetItemModel>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.external_code == code).cloned())
    }

    async fn list_children(&self, parent_id: Option<&str>) -> AppResult<Vec<AssetItemModel>> {
        let items = self.items.read().await;
        let mut children: Vec<AssetItemModel> = items
            .iter()
            .filter(|i| i.parent_id.as_deref() == parent_id)
            .cloned()
            .collect();
        // stable: insertion order breaks name ties
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn update(&self, id: &str, changes: AssetItemChanges) -> AppResult<AssetItemModel> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;

        if changes.decommission_date.is_some() {
            if let Some(date) = item.decommission_date {
                return Err(AppError::AlreadyDecommissioned {
                    name: item.name.clone(),
                    date,
                });
            }
            item.decommission_date = changes.decommission_date;
        }
        if let Some(date) = changes.last_inventory_date {
            item.last_inventory_date = Some(date);
        }
        if let Some(line) = changes.append_note.as_deref() {
            item.notes = Some(append_note_line(item.notes.as_deref(), line));
        }
        item.updated_at = Utc::now().to_rfc3339();

        Ok(item.clone())
    }

    async fn set_parent(&self, id: &str, parent_id: Option<&str>) -> AppResult<AssetItemModel> {
        let mut items = self.items.write().await;

        if let Some(parent) = parent_id {
            if parent == id {
                return Err(AppError::InvalidInput(
                    "an item cannot be its own parent".to_string(),
                ));
            }
            if !items.iter().any(|i| i.id == parent) {
                return Err(AppError::InvalidInput(format!(
                    "referenced record does not exist ({})",
                    parent
                )));
            }
        }

        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;
        item.parent_id = parent_id.map(str::to_string);
        item.updated_at = Utc::now().to_rfc3339();

        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_item(code: &str, qr: &str) -> NewAssetItem {
        NewAssetItem {
            external_code: code.to_string(),
            parent_id: None,
            name: "Chair".to_string(),
            sequence_number: None,
            qr_code: qr.to_string(),
            acquisition_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryAssetItemStore::new();
        let created = store.create(new_item("C1", "Q1")).await.unwrap();

        let by_qr = store.find_by_qr_code("Q1").await.unwrap().unwrap();
        assert_eq!(by_qr.id, created.id);
        let by_code = store.find_by_external_code("C1").await.unwrap().unwrap();
        assert_eq!(by_code.id, created.id);
        assert!(store.find_by_qr_code("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryAssetItemStore::new();
        store.create(new_item("C1", "Q1")).await.unwrap();

        let err = store.create(new_item("C1", "Q2")).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(ref c) if c == EXTERNAL_CODE_CONSTRAINT));

        let err = store.create(new_item("C2", "Q1")).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(ref c) if c == QR_CODE_CONSTRAINT));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_decommission_is_rejected_without_writing() {
        let store = MemoryAssetItemStore::new();
        let item = store.create(new_item("C1", "Q1")).await.unwrap();
        let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();

        store
            .update(
                &item.id,
                AssetItemChanges {
                    decommission_date: Some(first),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = store
            .update(
                &item.id,
                AssetItemChanges {
                    decommission_date: Some(later),
                    append_note: Some("again".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AlreadyDecommissioned { ref name, date } if name == "Chair" && date == first
        ));

        let reread = store.find_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(reread.decommission_date, Some(first));
        assert_eq!(reread.notes, None);

        // Other changes still apply to a decommissioned item
        let noted = store
            .update(
                &item.id,
                AssetItemChanges {
                    append_note: Some("archived".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(noted.notes.as_deref(), Some("archived"));
        assert_eq!(noted.decommission_date, Some(first));
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let store = MemoryAssetItemStore::new();
        let err = store
            .update("nope", AssetItemChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_children_sorted_by_name() {
        let store = MemoryAssetItemStore::new();
        let root = store.create(new_item("R", "QR")).await.unwrap();
        for (code, name) in [("B", "Monitor"), ("A", "Keyboard")] {
            let mut child = new_item(code, &format!("Q{}", code));
            child.name = name.to_string();
            child.parent_id = Some(root.id.clone());
            store.create(child).await.unwrap();
        }

        let names: Vec<String> = store
            .list_children(Some(&root.id))
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Keyboard", "Monitor"]);

        let roots = store.list_children(None).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root.id);
    }
}
