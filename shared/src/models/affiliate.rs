//! Affiliate Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ActiveStatus;

/// Affiliate partner account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliate {
    #[serde(alias = "id_affiliate")]
    pub id: i64,
    #[serde(default, alias = "code")]
    pub code_affiliate: String,
    #[serde(default)]
    pub name_affiliate: String,
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
    /// Commission rate in percent
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub status: ActiveStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
