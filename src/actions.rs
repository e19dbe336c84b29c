//! Outcomes handed back to the calling UI.
//!
//! Workflows never render anything themselves; they return one of these
//! directives and the caller decides how to show it.

use serde::{Deserialize, Serialize};

/// Record model name used in `OpenRecord` directives for asset items.
pub const ASSET_ITEM_MODEL: &str = "asset_items";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wizard {
    CreateItems,
    Inventory,
    Decommission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDirective {
    /// Show the form view of a stored record.
    OpenRecord { model: String, record_id: String },
    /// Open a guided dialog, optionally pre-filling the parent item.
    OpenWizard {
        wizard: Wizard,
        default_parent_id: Option<String>,
    },
    Notify {
        title: String,
        message: String,
        level: NotificationLevel,
    },
}

impl ActionDirective {
    pub fn open_item(record_id: impl Into<String>) -> Self {
        Self::OpenRecord {
            model: ASSET_ITEM_MODEL.to_string(),
            record_id: record_id.into(),
        }
    }

    pub fn notify(
        title: impl Into<String>,
        message: impl Into<String>,
        level: NotificationLevel,
    ) -> Self {
        Self::Notify {
            title: title.into(),
            message: message.into(),
            level,
        }
    }

    /// Entry action on an item record: create components under it.
    pub fn create_items_wizard(parent_id: Option<&str>) -> Self {
        Self::OpenWizard {
            wizard: Wizard::CreateItems,
            default_parent_id: parent_id.map(str::to_string),
        }
    }

    pub fn inventory_wizard() -> Self {
        Self::OpenWizard {
            wizard: Wizard::Inventory,
            default_parent_id: None,
        }
    }

    pub fn decommission_wizard() -> Self {
        Self::OpenWizard {
            wizard: Wizard::Decommission,
            default_parent_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_json_is_tagged() {
        let json = serde_json::to_value(ActionDirective::open_item("abc")).unwrap();
        assert_eq!(json["type"], "open_record");
        assert_eq!(json["model"], "asset_items");
        assert_eq!(json["record_id"], "abc");

        let json = serde_json::to_value(ActionDirective::notify(
            "Success",
            "Created 3 item(s) successfully",
            NotificationLevel::Success,
        ))
        .unwrap();
        assert_eq!(json["type"], "notify");
        assert_eq!(json["level"], "success");
    }

    #[test]
    fn test_create_items_wizard_prefills_parent() {
        assert_eq!(
            ActionDirective::create_items_wizard(Some("p1")),
            ActionDirective::OpenWizard {
                wizard: Wizard::CreateItems,
                default_parent_id: Some("p1".to_string()),
            }
        );
    }
}
