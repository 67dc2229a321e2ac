//! Mutation controller for one resource's create/edit modal

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use shared::MutationReply;
use tokio::sync::watch;

use super::form::{FormMode, MutationFormState};
use super::validate::{validate, FormFields, ValidationErrors};
use crate::config::{ApiGroup, DEFAULT_CLOSE_DELAY};
use crate::error::{ClientError, ClientResult, ErrorContext};
use crate::http::HttpClient;
use crate::list::ListController;
use crate::resources::Editable;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Saved successfully";

/// Shown when the server assigns a default password but sends no note
pub const DEFAULT_PASSWORD_NOTE: &str =
    "A default password has been assigned. Ask the account owner to change it after the first login.";

/// Target of a create or update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationEndpoint {
    pub group: ApiGroup,
    pub path: String,
}

impl MutationEndpoint {
    pub fn new(group: ApiGroup, path: impl Into<String>) -> Self {
        Self {
            group,
            path: path.into(),
        }
    }
}

/// Result of a successful submit
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub message: String,
    pub notice: Option<String>,
    pub data: Option<Value>,
}

pub struct MutationController<R: Editable, C: HttpClient> {
    http: Arc<C>,
    list: Option<ListController<R, C>>,
    state: watch::Sender<MutationFormState>,
    close_delay: Duration,
}

impl<R: Editable, C: HttpClient> MutationController<R, C> {
    pub fn new(http: Arc<C>) -> Self {
        let (state, _) = watch::channel(MutationFormState::default());
        Self {
            http,
            list: None,
            state,
            close_delay: DEFAULT_CLOSE_DELAY,
        }
    }

    /// List refetched after every successful submit
    pub fn with_list(mut self, list: ListController<R, C>) -> Self {
        self.list = Some(list);
        self
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn state(&self) -> MutationFormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationFormState> {
        self.state.subscribe()
    }

    pub fn open_create(&self) {
        self.state.send_replace(MutationFormState::create());
    }

    pub fn open_edit(&self, row: &R) {
        self.state.send_replace(MutationFormState::edit(row.id(), row));
    }

    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        self.state.send_modify(|form| {
            form.fields.insert(name, value);
        });
    }

    /// Close the modal and drop whatever was entered
    pub fn close(&self) {
        self.state.send_replace(MutationFormState::default());
    }

    /// Validate the current fields without submitting
    pub fn check(&self) -> Result<(), ValidationErrors> {
        validate(&R::form_schema(), &self.state.borrow().fields)
    }

    /// Validate and submit
    ///
    /// Only one submit runs at a time, counting the close delay after a
    /// success. Validation failures send nothing. On success the owning
    /// list is refetched and the modal closes after the close delay; on
    /// failure the modal stays open with its fields.
    pub async fn submit(&self) -> ClientResult<SubmitOutcome> {
        let mut prepared: ClientResult<(FormMode, FormFields)> = Err(ClientError::Busy);
        self.state.send_if_modified(|form| {
            if form.is_saving {
                return false;
            }
            if let Err(errors) = validate(&R::form_schema(), &form.fields) {
                form.error_message = Some(errors.to_string());
                form.success_message = None;
                prepared = Err(ClientError::Validation(errors));
                return true;
            }
            form.is_saving = true;
            form.error_message = None;
            form.success_message = None;
            prepared = Ok((form.mode, form.fields.clone()));
            true
        });
        let (mode, fields) = prepared?;

        let endpoint = match mode {
            FormMode::Create => R::create_endpoint(),
            FormMode::Edit(id) => R::update_endpoint(id),
        };
        let body = R::payload(mode, fields);
        tracing::debug!(resource = R::NAME, path = %endpoint.path, ?mode, "Submitting form");

        let result: ClientResult<Value> = self.http.post(endpoint.group, &endpoint.path, &body).await;
        match result {
            Ok(value) => Ok(self.succeed(mode, value).await),
            Err(e) => {
                tracing::warn!(resource = R::NAME, error = %e, "Submit failed");
                let message = e.user_message(ErrorContext::Save);
                self.state.send_modify(|form| {
                    form.is_saving = false;
                    form.error_message = Some(message);
                });
                Err(e)
            }
        }
    }

    async fn succeed(&self, mode: FormMode, value: Value) -> SubmitOutcome {
        let reply: MutationReply = match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => MutationReply::default(),
        };

        let message = reply
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
        let notice = (R::ISSUES_DEFAULT_PASSWORD && mode == FormMode::Create).then(|| {
            reply
                .password_note
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PASSWORD_NOTE.to_string())
        });

        // Stays saving until the modal closes so the same create cannot be resent
        self.state.send_modify(|form| {
            form.success_message = Some(message.clone());
            form.notice = notice.clone();
        });
        tracing::info!(resource = R::NAME, ?mode, "Saved");

        let refetch = async {
            if let Some(list) = &self.list {
                if let Err(e) = list.refresh().await {
                    tracing::debug!(resource = R::NAME, error = %e, "Refetch after save failed");
                }
            }
        };
        tokio::join!(refetch, tokio::time::sleep(self.close_delay));

        self.close();

        SubmitOutcome {
            message,
            notice,
            data: reply.data,
        }
    }
}
