//! Page-local aggregates
//!
//! These sum over the rows currently loaded in a list, not over the whole
//! filtered set on the server.

use rust_decimal::Decimal;
use shared::models::{InventoryItem, Order, OrderStatus};

/// Sum of `qty × price` over the loaded inventory rows
pub fn inventory_value(rows: &[InventoryItem]) -> Decimal {
    rows.iter().map(InventoryItem::value).sum()
}

/// Revenue ("omzet") of the loaded orders that were paid or completed
pub fn order_omzet(rows: &[Order]) -> Decimal {
    rows.iter()
        .filter(|o| matches!(o.status, OrderStatus::Paid | OrderStatus::Completed))
        .map(Order::display_total)
        .sum()
}

/// Count of loaded orders per status, in [`OrderStatus::ALL`] order
pub fn orders_by_status(rows: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| (status, rows.iter().filter(|o| o.status == status).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inventory_value() {
        let rows: Vec<InventoryItem> = serde_json::from_value(json!([
            { "id": 1, "qty": 3, "price": "10000" },
            { "id": 2, "qty": 2, "price": 2500 }
        ]))
        .unwrap();
        assert_eq!(inventory_value(&rows), Decimal::from(35_000));
    }

    #[test]
    fn test_omzet_skips_unpaid_orders() {
        let rows: Vec<Order> = serde_json::from_value(json!([
            { "id": 1, "status": "paid", "total": 100 },
            { "id": 2, "status": "cancelled", "total": 999 },
            { "id": 3, "status": "completed", "items": [{ "voucher_id": 1, "qty": 2, "price": 25 }] }
        ]))
        .unwrap();
        assert_eq!(order_omzet(&rows), Decimal::from(150));

        let counts = orders_by_status(&rows);
        assert_eq!(counts[0], (OrderStatus::Pending, 0));
        assert!(counts.contains(&(OrderStatus::Cancelled, 1)));
    }
}
