//! Order composer ("transaksi" create form)
//!
//! Orders own line items; the total is always the sum of the line-item
//! subtotals of the draft as it is now.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::Order;
use tokio::sync::watch;

use crate::config::{ApiGroup, DEFAULT_CLOSE_DELAY};
use crate::error::{ClientError, ClientResult, ErrorContext};
use crate::http::HttpClient;
use crate::list::ListController;
use crate::mutation::ValidationErrors;

const ADD_ORDER_PATH: &str = "/orders/add-order";

/// One line of a draft order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDraft {
    pub voucher_id: i64,
    pub qty: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl LineItemDraft {
    /// `None` when `qty * price` does not fit a `Decimal`
    pub fn subtotal(&self) -> Option<Decimal> {
        Decimal::from(self.qty).checked_mul(self.price)
    }
}

/// Order being composed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub member_id: Option<i64>,
    #[serde(rename = "payment_methode")]
    pub payment_method: String,
    pub items: Vec<LineItemDraft>,
}

impl OrderDraft {
    /// Sum of line subtotals, `None` on overflow
    pub fn checked_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.subtotal()?))
    }

    /// Display total; saturates where [`OrderDraft::checked_total`] overflows
    pub fn total(&self) -> Decimal {
        self.checked_total().unwrap_or(Decimal::MAX)
    }

    /// Add a voucher line; an existing line for the same voucher and price
    /// has its quantity increased instead
    pub fn add_item(&mut self, voucher_id: i64, qty: i64, price: Decimal) -> Result<(), ValidationErrors> {
        match self
            .items
            .iter_mut()
            .enumerate()
            .find(|(_, i)| i.voucher_id == voucher_id && i.price == price)
        {
            Some((idx, item)) => {
                let Some(merged) = item.qty.checked_add(qty) else {
                    let mut errors = ValidationErrors::default();
                    errors.push(
                        format!("items[{}].qty", idx),
                        format!("Line {}: quantity is too large", idx + 1),
                    );
                    return Err(errors);
                };
                item.qty = merged;
            }
            None => self.items.push(LineItemDraft {
                voucher_id,
                qty,
                price,
            }),
        }
        Ok(())
    }

    pub fn set_qty(&mut self, index: usize, qty: i64) {
        if let Some(item) = self.items.get_mut(index) {
            item.qty = qty;
        }
    }

    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if !self.member_id.is_some_and(|id| id > 0) {
            errors.push("member_id", "Member is required");
        }
        if self.payment_method.trim().is_empty() {
            errors.push("payment_methode", "Payment method is required");
        }
        if self.items.is_empty() {
            errors.push("items", "Add at least one voucher");
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.voucher_id <= 0 {
                errors.push(format!("items[{}].voucher_id", idx), format!("Line {}: voucher is required", idx + 1));
            }
            if item.qty <= 0 {
                errors.push(
                    format!("items[{}].qty", idx),
                    format!("Line {}: quantity must be a positive whole number", idx + 1),
                );
            }
            if item.price.is_sign_negative() {
                errors.push(format!("items[{}].price", idx), format!("Line {}: price cannot be negative", idx + 1));
            }
            if item.subtotal().is_none() {
                errors.push(format!("items[{}].price", idx), format!("Line {}: amount is too large", idx + 1));
            }
        }
        if errors.is_empty() && self.checked_total().is_none() {
            errors.push("items", "Order total is too large");
        }
        errors.into_result()
    }
}

/// Echo of the created order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderReceipt {
    pub code_trx: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AddOrderReply {
    data: Option<OrderReceipt>,
}

/// Observable composer state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderFormState {
    pub draft: OrderDraft,
    pub is_open: bool,
    pub is_saving: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl OrderFormState {
    pub fn total(&self) -> Decimal {
        self.draft.total()
    }
}

pub struct OrderComposer<C: HttpClient> {
    http: Arc<C>,
    list: Option<ListController<Order, C>>,
    state: watch::Sender<OrderFormState>,
    close_delay: Duration,
}

impl<C: HttpClient> OrderComposer<C> {
    pub fn new(http: Arc<C>) -> Self {
        let (state, _) = watch::channel(OrderFormState::default());
        Self {
            http,
            list: None,
            state,
            close_delay: DEFAULT_CLOSE_DELAY,
        }
    }

    pub fn with_list(mut self, list: ListController<Order, C>) -> Self {
        self.list = Some(list);
        self
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn state(&self) -> OrderFormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrderFormState> {
        self.state.subscribe()
    }

    pub fn open(&self) {
        self.state.send_replace(OrderFormState {
            is_open: true,
            ..OrderFormState::default()
        });
    }

    pub fn close(&self) {
        self.state.send_replace(OrderFormState::default());
    }

    /// Edit the draft in place
    pub fn edit(&self, f: impl FnOnce(&mut OrderDraft)) {
        self.state.send_modify(|form| f(&mut form.draft));
    }

    pub async fn submit(&self) -> ClientResult<OrderReceipt> {
        let mut prepared: ClientResult<OrderDraft> = Err(ClientError::Busy);
        self.state.send_if_modified(|form| {
            if form.is_saving {
                return false;
            }
            if let Err(errors) = form.draft.validate() {
                form.error_message = Some(errors.to_string());
                prepared = Err(ClientError::Validation(errors));
                return true;
            }
            form.is_saving = true;
            form.error_message = None;
            prepared = Ok(form.draft.clone());
            true
        });
        let draft = prepared?;
        tracing::debug!(items = draft.items.len(), total = %draft.total(), "Submitting order");

        let result: ClientResult<AddOrderReply> =
            self.http.post(ApiGroup::Primary, ADD_ORDER_PATH, &draft).await;
        let receipt = result.and_then(|reply| {
            reply
                .data
                .ok_or_else(|| ClientError::InvalidResponse("Missing order data".into()))
        });

        match receipt {
            Ok(receipt) => {
                tracing::info!(code_trx = %receipt.code_trx, "Order created");
                // Still saving until closed, a second submit is refused
                self.state.send_modify(|form| {
                    form.success_message = Some(format!("Order {} created", receipt.code_trx));
                });
                let refetch = async {
                    if let Some(list) = &self.list {
                        if let Err(e) = list.refresh().await {
                            tracing::debug!(error = %e, "Order list refetch failed");
                        }
                    }
                };
                tokio::join!(refetch, tokio::time::sleep(self.close_delay));
                self.close();
                Ok(receipt)
            }
            Err(e) => {
                let message = e.user_message(ErrorContext::Save);
                self.state.send_modify(|form| {
                    form.is_saving = false;
                    form.error_message = Some(message);
                });
                Err(e)
            }
        }
    }
}
