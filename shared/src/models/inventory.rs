//! Inventory Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ActiveStatus;

/// Stock of one voucher held for sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(alias = "id_inventory")]
    pub id: i64,
    #[serde(default, alias = "code")]
    pub code_inventory: String,
    #[serde(default)]
    pub voucher_id: Option<i64>,
    #[serde(default, alias = "name")]
    pub name_voucher: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub status: ActiveStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl InventoryItem {
    /// Stock value (`qty × price`)
    pub fn value(&self) -> Decimal {
        Decimal::from(self.qty) * self.price
    }
}
