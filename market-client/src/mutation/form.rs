//! Create/edit form state

use serde::Serialize;
use serde_json::Value;

use super::validate::FormFields;

/// Whether the modal creates a record or edits one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(i64),
}

/// State of one create/edit modal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationFormState {
    pub fields: FormFields,
    pub mode: FormMode,
    pub is_open: bool,
    pub is_saving: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    /// One-time notice such as the default password note
    pub notice: Option<String>,
}

impl MutationFormState {
    pub fn create() -> Self {
        Self {
            is_open: true,
            ..Self::default()
        }
    }

    /// Edit form populated from a row's JSON form
    pub fn edit<T: Serialize>(id: i64, row: &T) -> Self {
        let fields = match serde_json::to_value(row) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => FormFields::new(),
        };
        Self {
            fields,
            mode: FormMode::Edit(id),
            is_open: true,
            ..Self::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
