//! Voucher Model
//!
//! The backend calls these "projects" on some screens.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ActiveStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    #[serde(alias = "id_voucher", alias = "id_project")]
    pub id: i64,
    #[serde(default, alias = "code")]
    pub code_voucher: String,
    #[serde(default, alias = "name")]
    pub name_voucher: String,
    #[serde(default)]
    pub vendor_id: Option<i64>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub status: ActiveStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
