use chrono::NaiveDate;
use tonic::{Request, Response, Status};

use super::{
    AssetItemsService, CreateItemsRequest, DecommissionRequest, InventoryRequest,
};
use crate::actions::{ActionDirective as Directive, NotificationLevel as Level, Wizard};
use crate::error::AppError;
use crate::models::AssetItemModel;
use crate::proto::items::asset_items_server::AssetItems;
use crate::proto::items::{
    action_directive, ActionDirective, AssetItem, CreateItemsReq, CreateItemsRes, GetItemReq,
    GetItemRes, ListItemsReq, ListItemsRes, MoveItemReq, MoveItemRes, Notification,
    NotificationLevel, OpenRecord, OpenWizard, ProcessDecommissionReq, ProcessDecommissionRes,
    ProcessInventoryReq, ProcessInventoryRes, SearchByCodeReq, WizardActionReq, WizardKind,
};

/// gRPC adapter over [`AssetItemsService`].
pub struct AssetItemsServiceImpl {
    service: AssetItemsService,
}

impl AssetItemsServiceImpl {
    pub fn new(service: AssetItemsService) -> Self {
        Self { service }
    }

    fn model_to_proto(model: &AssetItemModel) -> AssetItem {
        AssetItem {
            id: model.id.clone(),
            external_code: model.external_code.clone(),
            parent_id: model.parent_id.clone().unwrap_or_default(),
            name: model.name.clone(),
            sequence_number: model.sequence_number,
            qr_code: model.qr_code.clone(),
            acquisition_date: date_to_proto(model.acquisition_date),
            last_inventory_date: date_to_proto(model.last_inventory_date),
            decommission_date: date_to_proto(model.decommission_date),
            notes: model.notes.clone().unwrap_or_default(),
            created_at: model.created_at.clone(),
            updated_at: model.updated_at.clone(),
        }
    }

    fn directive_to_proto(directive: &Directive) -> ActionDirective {
        let kind = match directive {
            Directive::OpenRecord { model, record_id } => {
                action_directive::Kind::OpenRecord(OpenRecord {
                    model: model.clone(),
                    record_id: record_id.clone(),
                })
            }
            Directive::OpenWizard {
                wizard,
                default_parent_id,
            } => action_directive::Kind::OpenWizard(OpenWizard {
                wizard: wizard_to_proto(*wizard).into(),
                default_parent_id: default_parent_id.clone().unwrap_or_default(),
            }),
            Directive::Notify {
                title,
                message,
                level,
            } => action_directive::Kind::Notification(Notification {
                title: title.clone(),
                message: message.clone(),
                level: level_to_proto(*level).into(),
            }),
        };
        ActionDirective { kind: Some(kind) }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn date_to_proto(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(field: &str, value: &str) -> Result<Option<NaiveDate>, Status> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Status::invalid_argument(format!("{} must be YYYY-MM-DD", field)))
}

fn wizard_to_proto(wizard: Wizard) -> WizardKind {
    match wizard {
        Wizard::CreateItems => WizardKind::CreateItems,
        Wizard::Inventory => WizardKind::Inventory,
        Wizard::Decommission => WizardKind::Decommission,
    }
}

fn level_to_proto(level: Level) -> NotificationLevel {
    match level {
        Level::Info => NotificationLevel::Info,
        Level::Success => NotificationLevel::Success,
        Level::Warning => NotificationLevel::Warning,
        Level::Danger => NotificationLevel::Danger,
    }
}

#[tonic::async_trait]
impl AssetItems for AssetItemsServiceImpl {
    async fn create_items(
        &self,
        request: Request<CreateItemsReq>,
    ) -> Result<Response<CreateItemsRes>, Status> {
        let req = request.into_inner();
        let acquisition_date = parse_date("acquisition_date", &req.acquisition_date)?;

        let outcome = self
            .service
            .create_items(CreateItemsRequest {
                name: req.name,
                count: req.count,
                parent_id: non_empty(req.parent_id),
                print_labels: req.print_labels,
                acquisition_date,
            })
            .await?;

        Ok(Response::new(CreateItemsRes {
            created: outcome.created.iter().map(Self::model_to_proto).collect(),
            requested: outcome.requested,
            failed_position: outcome.failure.as_ref().map(|f| f.position),
            failure_message: outcome
                .failure
                .as_ref()
                .map(|f| f.error.to_string())
                .unwrap_or_default(),
            directive: Some(Self::directive_to_proto(&outcome.directive)),
        }))
    }

    async fn process_inventory(
        &self,
        request: Request<ProcessInventoryReq>,
    ) -> Result<Response<ProcessInventoryRes>, Status> {
        let req = request.into_inner();

        let outcome = self
            .service
            .process_inventory(InventoryRequest {
                qr_code: req.qr_code,
                notes: non_empty(req.notes),
                create_maintenance_case: req.create_maintenance_case,
                maintenance_description: non_empty(req.maintenance_description),
            })
            .await?;

        Ok(Response::new(ProcessInventoryRes {
            item: Some(Self::model_to_proto(&outcome.item)),
            maintenance_request_id: outcome.maintenance_request_id.unwrap_or_default(),
            directive: Some(Self::directive_to_proto(&outcome.directive)),
        }))
    }

    async fn process_decommission(
        &self,
        request: Request<ProcessDecommissionReq>,
    ) -> Result<Response<ProcessDecommissionRes>, Status> {
        let req = request.into_inner();

        let outcome = self
            .service
            .process_decommission(DecommissionRequest {
                qr_code: req.qr_code,
                reason: req.reason,
            })
            .await?;

        Ok(Response::new(ProcessDecommissionRes {
            item: Some(Self::model_to_proto(&outcome.item)),
            directive: Some(Self::directive_to_proto(&outcome.directive)),
        }))
    }

    async fn get_item(
        &self,
        request: Request<GetItemReq>,
    ) -> Result<Response<GetItemRes>, Status> {
        let req = request.into_inner();

        if req.id.is_empty() {
            return Err(Status::invalid_argument("id is required"));
        }

        let model = self.service.get_item(&req.id).await?;
        Ok(Response::new(GetItemRes {
            item: Some(Self::model_to_proto(&model)),
        }))
    }

    async fn list_items(
        &self,
        request: Request<ListItemsReq>,
    ) -> Result<Response<ListItemsRes>, Status> {
        let req = request.into_inner();
        let parent_id = non_empty(req.parent_id);

        let models = self.service.list_components(parent_id.as_deref()).await?;

        let items: Vec<AssetItem> = models.iter().map(Self::model_to_proto).collect();
        Ok(Response::new(ListItemsRes { items }))
    }

    async fn move_item(
        &self,
        request: Request<MoveItemReq>,
    ) -> Result<Response<MoveItemRes>, Status> {
        let req = request.into_inner();

        if req.id.is_empty() {
            return Err(Status::invalid_argument("id is required"));
        }
        let new_parent_id = non_empty(req.new_parent_id);

        let model = self
            .service
            .move_item(&req.id, new_parent_id.as_deref())
            .await?;
        Ok(Response::new(MoveItemRes {
            item: Some(Self::model_to_proto(&model)),
        }))
    }

    async fn search_by_code(
        &self,
        request: Request<SearchByCodeReq>,
    ) -> Result<Response<GetItemRes>, Status> {
        let req = request.into_inner();

        let model = self
            .service
            .find_by_scanned_code(&req.code)
            .await?
            .ok_or_else(|| Status::not_found("Item not found"))?;

        Ok(Response::new(GetItemRes {
            item: Some(Self::model_to_proto(&model)),
        }))
    }

    async fn open_wizard(
        &self,
        request: Request<WizardActionReq>,
    ) -> Result<Response<ActionDirective>, Status> {
        let req = request.into_inner();
        let item_id = non_empty(req.item_id);

        let directive = match WizardKind::try_from(req.wizard) {
            Ok(WizardKind::CreateItems) => {
                // Components default to the record the wizard was opened from
                if let Some(id) = item_id.as_deref() {
                    self.service.get_item(id).await?;
                }
                Directive::create_items_wizard(item_id.as_deref())
            }
            Ok(WizardKind::Inventory) => Directive::inventory_wizard(),
            Ok(WizardKind::Decommission) => Directive::decommission_wizard(),
            Ok(WizardKind::Unspecified) | Err(_) => {
                return Err(AppError::InvalidInput("unknown wizard".to_string()).into())
            }
        };

        Ok(Response::new(Self::directive_to_proto(&directive)))
    }
}
