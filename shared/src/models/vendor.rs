//! Vendor Model

use serde::{Deserialize, Serialize};

use super::ActiveStatus;

/// Vendor (voucher issuer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(alias = "id_vendor")]
    pub id: i64,
    #[serde(default, alias = "code")]
    pub code_vendor: String,
    #[serde(default)]
    pub name_vendor: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub status: ActiveStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
