use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AssetItemModel {
    pub id: String,
    pub external_code: String,
    pub parent_id: Option<String>,
    pub name: String,
    /// 1-indexed position within a batch; `None` for items created alone
    pub sequence_number: Option<i32>,
    /// Base64 PNG of the QR code encoding `external_code`
    pub qr_code: String,
    pub acquisition_date: Option<NaiveDate>,
    pub last_inventory_date: Option<NaiveDate>,
    pub decommission_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLifecycle {
    Active,
    Decommissioned,
}

impl AssetItemModel {
    pub fn lifecycle(&self) -> ItemLifecycle {
        if self.decommission_date.is_some() {
            ItemLifecycle::Decommissioned
        } else {
            ItemLifecycle::Active
        }
    }

    pub fn is_decommissioned(&self) -> bool {
        self.lifecycle() == ItemLifecycle::Decommissioned
    }

    /// Note lines in insertion order.
    pub fn note_lines(&self) -> Vec<&str> {
        self.notes
            .as_deref()
            .map(|n| n.lines().filter(|l| !l.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Fields for a freshly minted item.
#[derive(Debug, Clone)]
pub struct NewAssetItem {
    pub external_code: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub sequence_number: Option<i32>,
    pub qr_code: String,
    pub acquisition_date: Option<NaiveDate>,
}

/// Changes applied to an existing item in one write.
///
/// `decommission_date` only takes effect while the stored value is unset and
/// `append_note` is added as a new line; neither can clear existing data.
#[derive(Debug, Clone, Default)]
pub struct AssetItemChanges {
    pub last_inventory_date: Option<NaiveDate>,
    pub decommission_date: Option<NaiveDate>,
    pub append_note: Option<String>,
}

impl AssetItemChanges {
    pub fn is_empty(&self) -> bool {
        self.last_inventory_date.is_none()
            && self.decommission_date.is_none()
            && self.append_note.is_none()
    }
}

/// Appends `line` to an existing notes log.
pub fn append_note_line(existing: Option<&str>, line: &str) -> String {
    match existing {
        Some(notes) if !notes.is_empty() => format!("{}\n{}", notes, line),
        _ => line.to_string(),
    }
}
