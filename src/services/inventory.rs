use serde::{Deserialize, Serialize};

use super::AssetItemsService;
use crate::actions::ActionDirective;
use crate::error::AppResult;
use crate::models::{AssetItemChanges, AssetItemModel, MaintenanceRequest};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryRequest {
    /// Scanned value: the QR payload or the item's external code
    pub qr_code: String,
    pub notes: Option<String>,
    pub create_maintenance_case: bool,
    pub maintenance_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InventoryOutcome {
    pub item: AssetItemModel,
    pub maintenance_request_id: Option<String>,
    pub directive: ActionDirective,
}

/// Notes log line for a check-in. Line breaks in the user text are folded so
/// each check-in adds exactly one line.
pub(crate) fn inventory_note_line(stamp: &str, text: Option<&str>) -> String {
    let text = text
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("[INVENTORY {}] {}", stamp, text)
}

impl AssetItemsService {
    pub async fn process_inventory(&self, req: InventoryRequest) -> AppResult<InventoryOutcome> {
        let item = self.require_scanned(&req.qr_code).await?;
        let now = self.clock.now();

        tracing::info!("ProcessInventory called: id={}, name={}", item.id, item.name);

        let line = inventory_note_line(
            &now.format("%Y-%m-%d %H:%M:%S").to_string(),
            req.notes.as_deref(),
        );
        let item = self
            .store
            .update(
                &item.id,
                AssetItemChanges {
                    last_inventory_date: Some(now.date()),
                    append_note: Some(line),
                    ..Default::default()
                },
            )
            .await?;

        let description = req
            .maintenance_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let maintenance_request_id = match description {
            Some(description) if req.create_maintenance_case => {
                self.request_maintenance(&item, description).await
            }
            _ => None,
        };

        Ok(InventoryOutcome {
            directive: ActionDirective::open_item(&item.id),
            item,
            maintenance_request_id,
        })
    }

    /// Best effort: a missing or failing maintenance desk never fails the check-in.
    async fn request_maintenance(&self, item: &AssetItemModel, description: &str) -> Option<String> {
        let desk = match &self.maintenance {
            Some(desk) if desk.is_available() => desk,
            _ => {
                tracing::debug!(
                    "Maintenance desk unavailable, skipping request for item {}",
                    item.id
                );
                return None;
            }
        };

        let request = MaintenanceRequest {
            name: format!("Maintenance: {}", item.name),
            description: description.to_string(),
            equipment_ref: Some(item.id.clone()),
        };
        match desk.create_request(request).await {
            Ok(id) => {
                tracing::info!("Maintenance request {} created for item {}", id, item.id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Failed to create maintenance request for item {}: {}", item.id, e);
                None
            }
        }
    }
}
