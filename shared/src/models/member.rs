//! Member Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ActiveStatus;

/// Member (end customer), optionally attached to an affiliate via referral code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(alias = "id_member")]
    pub id: i64,
    #[serde(default, alias = "code")]
    pub code_member: String,
    #[serde(default, alias = "name")]
    pub name_member: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub affiliate_id: Option<i64>,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub status: ActiveStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
