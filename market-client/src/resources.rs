//! Resource descriptors
//!
//! Each entity screen is one [`Resource`] (list) and optionally one
//! [`Editable`] (create/edit modal). The controllers are generic over these
//! traits, so adding a screen means declaring its endpoints and schemas.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::models::{
    Affiliate, InventoryItem, Member, Order, Redemption, Vendor, Voucher,
};

use crate::config::ApiGroup;
use crate::export::Column;
use crate::list::{ListEndpoint, ListSchema, Pagination, SortDirection, StatusFilter};
use crate::mutation::{Check, FieldRule, FormFields, FormMode, FormSchema, MutationEndpoint};

/// A listable backend resource
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Singular name, used in paths, logs and export file names
    const NAME: &'static str;

    fn list_endpoint() -> ListEndpoint;

    fn list_schema() -> ListSchema;

    fn id(&self) -> i64;

    fn csv_columns() -> Vec<Column<Self>>;
}

/// A resource with a create/edit modal
pub trait Editable: Resource {
    /// Server assigns a default password on create and may return a note
    const ISSUES_DEFAULT_PASSWORD: bool = false;

    fn form_schema() -> FormSchema;

    fn create_endpoint() -> MutationEndpoint {
        let group = Self::list_endpoint().group;
        MutationEndpoint::new(group, format!("/{0}/add-{0}", Self::NAME))
    }

    fn update_endpoint(id: i64) -> MutationEndpoint {
        let group = Self::list_endpoint().group;
        MutationEndpoint::new(group, format!("/{0}/update-{0}/{1}", Self::NAME, id))
    }

    /// Request body: the schema's fields, plus `id` when editing
    fn payload(mode: FormMode, fields: FormFields) -> FormFields {
        let schema = Self::form_schema();
        let mut body: FormFields = fields
            .into_iter()
            .filter(|(k, _)| schema.field(k).is_some())
            .collect();
        if let FormMode::Edit(id) = mode {
            body.insert("id".to_string(), Value::from(id));
        }
        body
    }
}

const fn list_endpoint(
    group: ApiGroup,
    path: &'static str,
    rows_key: &'static str,
) -> ListEndpoint {
    ListEndpoint {
        group,
        path,
        rows_key,
        pagination: Pagination::LimitOffset,
    }
}

const NAME_CHECKS: &[Check] = &[Check::Required, Check::MaxLen(100)];
const EMAIL_CHECKS: &[Check] = &[Check::Required, Check::Email];
const OPTIONAL_EMAIL: &[Check] = &[Check::Email];
const PHONE_CHECKS: &[Check] = &[Check::MaxLen(20)];
const PERCENT: &[Check] = &[Check::NumberRange {
    min: Some(0.0),
    max: Some(100.0),
}];
const PRICE: &[Check] = &[
    Check::Required,
    Check::NumberRange {
        min: Some(0.0),
        max: None,
    },
];
const REQUIRED_ID: &[Check] = &[Check::Required, Check::PositiveInteger];
const FREE_TEXT: &[Check] = &[Check::MaxLen(255)];

// ========== Affiliate ==========

impl Resource for Affiliate {
    const NAME: &'static str = "affiliate";

    fn list_endpoint() -> ListEndpoint {
        list_endpoint(ApiGroup::Primary, "/affiliate/list-affiliate", "affiliates")
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["name_affiliate", "code_affiliate", "commission", "created_at"],
            default_sort: Some(("created_at", SortDirection::Desc)),
            status_filter: StatusFilter::Active,
            extra_filters: &[],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Code", "code_affiliate"),
            Column::field("Name", "name_affiliate"),
            Column::field("Email", "email"),
            Column::field("Phone", "phone"),
            Column::derived("Address", |a: &Affiliate| {
                join_address(&[&a.address, &a.city, &a.province, &a.postal_code])
            }),
            Column::derived("Commission (%)", |a: &Affiliate| a.commission.to_string()),
            Column::derived("Status", |a: &Affiliate| a.status.label().to_string()),
            Column::field("Created", "created_at"),
        ]
    }
}

impl Editable for Affiliate {
    const ISSUES_DEFAULT_PASSWORD: bool = true;

    fn form_schema() -> FormSchema {
        FormSchema {
            fields: &[
                FieldRule { name: "name_affiliate", label: "Name", checks: NAME_CHECKS },
                FieldRule { name: "email", label: "Email", checks: EMAIL_CHECKS },
                FieldRule { name: "phone", label: "Phone", checks: PHONE_CHECKS },
                FieldRule { name: "address", label: "Address", checks: FREE_TEXT },
                FieldRule { name: "city", label: "City", checks: FREE_TEXT },
                FieldRule { name: "province", label: "Province", checks: FREE_TEXT },
                FieldRule { name: "postal_code", label: "Postal code", checks: PHONE_CHECKS },
                FieldRule { name: "commission", label: "Commission", checks: PERCENT },
            ],
        }
    }
}

// ========== Member ==========

impl Resource for Member {
    const NAME: &'static str = "member";

    fn list_endpoint() -> ListEndpoint {
        list_endpoint(ApiGroup::Primary, "/member/list-member", "members")
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["name_member", "code_member", "referral_code", "created_at"],
            default_sort: Some(("created_at", SortDirection::Desc)),
            status_filter: StatusFilter::Active,
            extra_filters: &[],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Code", "code_member"),
            Column::field("Name", "name_member"),
            Column::field("Email", "email"),
            Column::field("Phone", "phone"),
            Column::field("Referral", "referral_code"),
            Column::derived("Commission (%)", |m: &Member| m.commission.to_string()),
            Column::derived("Status", |m: &Member| m.status.label().to_string()),
            Column::field("Created", "created_at"),
        ]
    }
}

impl Editable for Member {
    fn form_schema() -> FormSchema {
        FormSchema {
            fields: &[
                FieldRule { name: "name_member", label: "Name", checks: NAME_CHECKS },
                FieldRule { name: "email", label: "Email", checks: OPTIONAL_EMAIL },
                FieldRule { name: "phone", label: "Phone", checks: PHONE_CHECKS },
                FieldRule {
                    name: "referral_code",
                    label: "Referral code",
                    checks: &[Check::Required, Check::MaxLen(32)],
                },
                FieldRule { name: "commission", label: "Commission", checks: PERCENT },
            ],
        }
    }
}

// ========== Vendor ==========

impl Resource for Vendor {
    const NAME: &'static str = "vendor";

    fn list_endpoint() -> ListEndpoint {
        list_endpoint(ApiGroup::Primary, "/vendor/list-vendor", "vendors")
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["name_vendor", "code_vendor", "city", "created_at"],
            default_sort: Some(("created_at", SortDirection::Desc)),
            status_filter: StatusFilter::Active,
            extra_filters: &[],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Code", "code_vendor"),
            Column::field("Name", "name_vendor"),
            Column::field("Email", "email"),
            Column::field("Phone", "phone"),
            Column::derived("Address", |v: &Vendor| {
                join_address(&[&v.address, &v.city, &v.province, &v.postal_code])
            }),
            Column::derived("Status", |v: &Vendor| v.status.label().to_string()),
            Column::field("Created", "created_at"),
        ]
    }
}

impl Editable for Vendor {
    const ISSUES_DEFAULT_PASSWORD: bool = true;

    fn form_schema() -> FormSchema {
        FormSchema {
            fields: &[
                FieldRule { name: "name_vendor", label: "Name", checks: NAME_CHECKS },
                FieldRule { name: "email", label: "Email", checks: EMAIL_CHECKS },
                FieldRule { name: "phone", label: "Phone", checks: PHONE_CHECKS },
                FieldRule { name: "address", label: "Address", checks: FREE_TEXT },
                FieldRule { name: "city", label: "City", checks: FREE_TEXT },
                FieldRule { name: "province", label: "Province", checks: FREE_TEXT },
                FieldRule { name: "postal_code", label: "Postal code", checks: PHONE_CHECKS },
            ],
        }
    }
}

// ========== Voucher ==========

impl Resource for Voucher {
    const NAME: &'static str = "voucher";

    fn list_endpoint() -> ListEndpoint {
        list_endpoint(ApiGroup::Legacy, "/voucher/list-voucher", "vouchers")
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["name_voucher", "code_voucher", "price", "valid_until"],
            default_sort: Some(("name_voucher", SortDirection::Asc)),
            status_filter: StatusFilter::Active,
            extra_filters: &["vendorId"],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Code", "code_voucher"),
            Column::field("Name", "name_voucher"),
            Column::field("Vendor", "vendor_id"),
            Column::derived("Price", |v: &Voucher| v.price.to_string()),
            Column::field("Valid until", "valid_until"),
            Column::derived("Status", |v: &Voucher| v.status.label().to_string()),
        ]
    }
}

impl Editable for Voucher {
    fn form_schema() -> FormSchema {
        FormSchema {
            fields: &[
                FieldRule { name: "name_voucher", label: "Name", checks: NAME_CHECKS },
                FieldRule { name: "vendor_id", label: "Vendor", checks: REQUIRED_ID },
                FieldRule { name: "price", label: "Price", checks: PRICE },
                FieldRule { name: "valid_until", label: "Valid until", checks: FREE_TEXT },
            ],
        }
    }
}

// ========== Inventory ==========

impl Resource for InventoryItem {
    const NAME: &'static str = "inventory";

    fn list_endpoint() -> ListEndpoint {
        list_endpoint(ApiGroup::Legacy, "/inventory/list-inventory", "inventories")
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["name_voucher", "qty", "price", "created_at"],
            default_sort: Some(("created_at", SortDirection::Desc)),
            status_filter: StatusFilter::Active,
            extra_filters: &[],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Code", "code_inventory"),
            Column::field("Voucher", "name_voucher"),
            Column::field("Qty", "qty"),
            Column::derived("Price", |i: &InventoryItem| i.price.to_string()),
            Column::derived("Value", |i: &InventoryItem| i.value().to_string()),
            Column::derived("Status", |i: &InventoryItem| i.status.label().to_string()),
        ]
    }
}

impl Editable for InventoryItem {
    fn form_schema() -> FormSchema {
        FormSchema {
            fields: &[
                FieldRule { name: "voucher_id", label: "Voucher", checks: REQUIRED_ID },
                FieldRule { name: "qty", label: "Quantity", checks: REQUIRED_ID },
                FieldRule { name: "price", label: "Price", checks: PRICE },
            ],
        }
    }
}

// ========== Order ==========

impl Resource for Order {
    const NAME: &'static str = "order";

    fn list_endpoint() -> ListEndpoint {
        ListEndpoint {
            group: ApiGroup::Primary,
            path: "/orders",
            rows_key: "data",
            pagination: Pagination::Page,
        }
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["created_at", "code_trx", "total"],
            default_sort: Some(("created_at", SortDirection::Desc)),
            status_filter: StatusFilter::Order,
            extra_filters: &["payment", "vendorId", "from", "to"],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Transaction", "code_trx"),
            Column::field("Member", "name_member"),
            Column::field("Payment", "payment_methode"),
            Column::derived("Status", |o: &Order| o.status.to_string()),
            Column::derived("Items", |o: &Order| o.items.len().to_string()),
            Column::derived("Total", |o: &Order| o.display_total().to_string()),
            Column::field("Created", "created_at"),
        ]
    }
}

// ========== Redemption ==========

impl Resource for Redemption {
    const NAME: &'static str = "redeem";

    fn list_endpoint() -> ListEndpoint {
        list_endpoint(ApiGroup::Legacy, "/redeem/list-redeem", "redeems")
    }

    fn list_schema() -> ListSchema {
        ListSchema {
            sortable: &["redeemed_at", "code_redeem"],
            default_sort: Some(("redeemed_at", SortDirection::Desc)),
            status_filter: StatusFilter::Active,
            extra_filters: &["from", "to"],
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn csv_columns() -> Vec<Column<Self>> {
        vec![
            Column::field("Code", "code_redeem"),
            Column::field("Voucher", "voucher_id"),
            Column::field("Member", "member_id"),
            Column::field("Transaction", "code_trx"),
            Column::derived("Status", |r: &Redemption| r.status.label().to_string()),
            Column::field("Redeemed", "redeemed_at"),
        ]
    }
}

fn join_address(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::to_csv;
    use serde_json::json;

    #[test]
    fn test_default_mutation_paths() {
        assert_eq!(Affiliate::create_endpoint().path, "/affiliate/add-affiliate");
        assert_eq!(Member::update_endpoint(7).path, "/member/update-member/7");
        assert_eq!(Voucher::create_endpoint().group, ApiGroup::Legacy);
    }

    #[test]
    fn test_payload_keeps_schema_fields_only() {
        let fields: FormFields = serde_json::from_value(json!({
            "name_member": "Sari",
            "referral_code": "REF1",
            "created_at": "2024-01-01",
            "status": 1
        }))
        .unwrap();
        let body = Member::payload(FormMode::Edit(3), fields);
        assert_eq!(body.get("name_member"), Some(&json!("Sari")));
        assert_eq!(body.get("id"), Some(&json!(3)));
        assert!(!body.contains_key("created_at"));
        assert!(!body.contains_key("status"));
    }

    #[test]
    fn test_affiliate_csv_columns() {
        let affiliate: Affiliate = serde_json::from_value(json!({
            "id": 1,
            "code_affiliate": "AFF-1",
            "name_affiliate": "Toko, Jaya",
            "address": "Jl. Merdeka 1",
            "city": "Bandung",
            "commission": "12.5",
            "status": 0
        }))
        .unwrap();
        let bytes = to_csv(&[affiliate], &Affiliate::csv_columns()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "AFF-1,\"Toko, Jaya\",,,\"Jl. Merdeka 1, Bandung\",12.5,Suspended,"
        );
    }

    #[test]
    fn test_sortable_fields_exist_on_records() {
        let order: Order = serde_json::from_value(json!({ "id": 1 })).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        for field in Order::list_schema().sortable {
            assert!(json.get(*field).is_some(), "missing {}", field);
        }
    }
}
