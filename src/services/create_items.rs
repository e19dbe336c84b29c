use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AssetItemsService;
use crate::actions::{ActionDirective, NotificationLevel};
use crate::error::{AppError, AppResult};
use crate::models::{AssetItemModel, NewAssetItem};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateItemsRequest {
    pub name: String,
    pub count: i64,
    pub parent_id: Option<String>,
    pub print_labels: bool,
    pub acquisition_date: Option<NaiveDate>,
}

/// The item that stopped a batch and why.
#[derive(Debug)]
pub struct BatchFailure {
    /// 1-indexed position of the failed item
    pub position: i64,
    pub error: AppError,
}

#[derive(Debug)]
pub struct CreateItemsOutcome {
    pub requested: i64,
    /// Items committed before the batch finished or stopped
    pub created: Vec<AssetItemModel>,
    pub failure: Option<BatchFailure>,
    pub directive: ActionDirective,
}

impl CreateItemsOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

impl AssetItemsService {
    /// Mints `count` items from one template.
    ///
    /// Items are committed one by one. When an item fails after others were
    /// already committed, the committed items are returned together with the
    /// failure; when the first item fails its error is returned directly.
    pub async fn create_items(&self, req: CreateItemsRequest) -> AppResult<CreateItemsOutcome> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("name is required".to_string()));
        }
        if req.count < 1 {
            return Err(AppError::InvalidInput(
                "count must be at least 1".to_string(),
            ));
        }
        if req.count > self.settings.max_batch_size {
            return Err(AppError::InvalidInput(format!(
                "count must not exceed {}",
                self.settings.max_batch_size
            )));
        }
        let parent_id = req
            .parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if let Some(parent) = parent_id {
            if self.store.find_by_id(parent).await?.is_none() {
                return Err(AppError::NotFound(format!("Parent item {} not found", parent)));
            }
        }

        tracing::info!(
            "CreateItems called: name={}, count={}, parent_id={:?}",
            name,
            req.count,
            parent_id
        );

        let mut created = Vec::with_capacity(req.count as usize);
        let mut failure = None;

        for position in 1..=req.count {
            match self
                .create_one(name, position, req.count, parent_id, req.acquisition_date)
                .await
            {
                Ok(item) => created.push(item),
                Err(error) if created.is_empty() => {
                    tracing::error!("CreateItems failed on first item: {}", error);
                    return Err(error);
                }
                Err(error) => {
                    tracing::warn!(
                        "CreateItems stopped at item {} of {}: {}",
                        position,
                        req.count,
                        error
                    );
                    failure = Some(BatchFailure { position, error });
                    break;
                }
            }
        }

        let directive = match &failure {
            Some(f) => ActionDirective::notify(
                "Partially created",
                format!(
                    "Created {} of {} item(s); item {} failed: {}",
                    created.len(),
                    req.count,
                    f.position,
                    f.error
                ),
                NotificationLevel::Warning,
            ),
            None if req.print_labels => ActionDirective::notify(
                "Labels generated",
                format!(
                    "QR labels generated for {} item(s). Printing is handled by the label report.",
                    created.len()
                ),
                NotificationLevel::Info,
            ),
            None => ActionDirective::notify(
                "Success",
                format!("Created {} item(s) successfully", created.len()),
                NotificationLevel::Success,
            ),
        };

        tracing::info!(
            "CreateItems result: created={}, requested={}",
            created.len(),
            req.count
        );

        Ok(CreateItemsOutcome {
            requested: req.count,
            created,
            failure,
            directive,
        })
    }

    async fn create_one(
        &self,
        name: &str,
        position: i64,
        count: i64,
        parent_id: Option<&str>,
        acquisition_date: Option<NaiveDate>,
    ) -> AppResult<AssetItemModel> {
        let sequence_number = if count > 1 {
            Some(i32::try_from(position).map_err(|_| {
                AppError::InvalidInput(format!("sequence {} out of range", position))
            })?)
        } else {
            None
        };
        let item_name = if count > 1 {
            format!("{} ({})", name, position)
        } else {
            name.to_string()
        };

        let mut attempt = 1;
        loop {
            let code = self.codes.generate(
                parent_id,
                sequence_number.unwrap_or(1),
                self.clock.now(),
            );
            let qr_code = self.encoder.encode_base64(&code)?;

            let result = self
                .store
                .create(NewAssetItem {
                    external_code: code.clone(),
                    parent_id: parent_id.map(str::to_string),
                    name: item_name.clone(),
                    sequence_number,
                    qr_code,
                    acquisition_date,
                })
                .await;

            match result {
                Err(e) if e.is_constraint_violation() && attempt < self.settings.item_code_attempts => {
                    tracing::debug!(
                        "Item code {} collided ({}), retrying with a new code",
                        code,
                        e
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::MemoryAssetItemStore;

    fn service() -> (AssetItemsService, MemoryAssetItemStore) {
        let store = MemoryAssetItemStore::new();
        (AssetItemsService::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_single_item_has_no_sequence() {
        let (service, _) = service();
        let outcome = service
            .create_items(CreateItemsRequest {
                name: "Projector".to_string(),
                count: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.created.len(), 1);
        let item = &outcome.created[0];
        assert_eq!(item.name, "Projector");
        assert_eq!(item.sequence_number, None);
        assert!(item.external_code.starts_with("ITEM-NEW-1-"));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_count() {
        let (service, store) = service();
        for count in [0, -3] {
            let err = service
                .create_items(CreateItemsRequest {
                    name: "Projector".to_string(),
                    count,
                    ..Default::default()
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_rejects_blank_name_and_oversized_batch() {
        let (service, store) = service();
        let err = service
            .create_items(CreateItemsRequest {
                name: "   ".to_string(),
                count: 2,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .create_items(CreateItemsRequest {
                name: "Chair".to_string(),
                count: 501,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let (service, store) = service();
        let err = service
            .create_items(CreateItemsRequest {
                name: "Wheel".to_string(),
                count: 4,
                parent_id: Some("does-not-exist".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_print_labels_directive() {
        let (service, _) = service();
        let outcome = service
            .create_items(CreateItemsRequest {
                name: "Badge".to_string(),
                count: 2,
                print_labels: true,
                ..Default::default()
            })
            .await
            .unwrap();

        match outcome.directive {
            ActionDirective::Notify { level, message, .. } => {
                assert_eq!(level, NotificationLevel::Info);
                assert!(message.contains("2 item(s)"));
            }
            other => panic!("unexpected directive: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_acquisition_date_is_persisted() {
        let (service, store) = service();
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        service
            .create_items(CreateItemsRequest {
                name: "Printer".to_string(),
                count: 2,
                acquisition_date: Some(date),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(store
            .all()
            .await
            .iter()
            .all(|i| i.acquisition_date == Some(date)));
    }
}
