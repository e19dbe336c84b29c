use serde::{Deserialize, Serialize};

/// A maintenance request raised from an inventory check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub name: String,
    pub description: String,
    /// Id of the asset item the request is about
    pub equipment_ref: Option<String>,
}
