//! Order Model ("transaksi")

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub voucher_id: i64,
    #[serde(default)]
    pub name_voucher: Option<String>,
    pub qty: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    /// `qty * price`, saturating at `Decimal::MAX`/`MIN`
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.qty).saturating_mul(self.price)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "id_order")]
    pub id: i64,
    #[serde(default)]
    pub code_trx: String,
    #[serde(default)]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub name_member: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<i64>,
    #[serde(default)]
    pub payment_methode: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Total as reported by the backend; see [`Order::computed_total`]
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Order {
    /// Sum of line-item subtotals
    pub fn computed_total(&self) -> Decimal {
        self.items
            .iter()
            .map(OrderItem::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Total to display: recomputed when the order carries its items
    pub fn display_total(&self) -> Decimal {
        if self.items.is_empty() {
            self.total
        } else {
            self.computed_total()
        }
    }
}
