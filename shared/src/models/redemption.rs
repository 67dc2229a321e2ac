//! Redemption Model

use serde::{Deserialize, Serialize};

use super::ActiveStatus;

/// A voucher code redeemed by a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    #[serde(alias = "id_redeem")]
    pub id: i64,
    #[serde(default, alias = "code")]
    pub code_redeem: String,
    #[serde(default)]
    pub voucher_id: Option<i64>,
    #[serde(default)]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub code_trx: Option<String>,
    #[serde(default)]
    pub status: ActiveStatus,
    #[serde(default)]
    pub redeemed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
