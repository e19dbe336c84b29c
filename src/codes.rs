//! External code minting for asset items.
//!
//! Codes read `PREFIX-<parent>-<sequence>-<YYYYMMDDHHMMSS>-<token>`. The parent
//! segment is the parent item id, or `NEW` for top-level items. The trailing
//! token is eight random hex characters, so two codes minted in the same second
//! for the same parent and sequence still differ.

use chrono::NaiveDateTime;
use uuid::Uuid;

pub const DEFAULT_ITEM_CODE_PREFIX: &str = "ITEM";

/// Parent segment used when an item has no parent.
pub const NO_PARENT_SEGMENT: &str = "NEW";

const TOKEN_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct ItemCodeGenerator {
    prefix: String,
}

impl ItemCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn generate(&self, parent_id: Option<&str>, sequence: i32, now: NaiveDateTime) -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}-{}-{}",
            self.prefix,
            parent_id.unwrap_or(NO_PARENT_SEGMENT),
            sequence,
            now.format("%Y%m%d%H%M%S"),
            &token[..TOKEN_LEN]
        )
    }
}

impl Default for ItemCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_CODE_PREFIX)
    }
}
