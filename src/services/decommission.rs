use serde::{Deserialize, Serialize};

use super::AssetItemsService;
use crate::actions::ActionDirective;
use crate::error::{AppError, AppResult};
use crate::models::{AssetItemChanges, AssetItemModel};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecommissionRequest {
    pub qr_code: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct DecommissionOutcome {
    pub item: AssetItemModel,
    pub directive: ActionDirective,
}

impl AssetItemsService {
    /// Retires an item for good. A second attempt fails and leaves the
    /// recorded date untouched.
    pub async fn process_decommission(
        &self,
        req: DecommissionRequest,
    ) -> AppResult<DecommissionOutcome> {
        let reason = req.reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput("reason is required".to_string()));
        }

        let item = self.require_scanned(&req.qr_code).await?;
        if let Some(date) = item.decommission_date {
            return Err(AppError::AlreadyDecommissioned {
                name: item.name,
                date,
            });
        }

        tracing::info!("ProcessDecommission called: id={}, name={}", item.id, item.name);

        let today = self.clock.today();
        let item = self
            .store
            .update(
                &item.id,
                AssetItemChanges {
                    decommission_date: Some(today),
                    append_note: Some(format!("Decommission reason: {}", reason)),
                    ..Default::default()
                },
            )
            .await?;

        Ok(DecommissionOutcome {
            directive: ActionDirective::open_item(&item.id),
            item,
        })
    }
}
