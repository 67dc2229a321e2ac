//! Mutation controller and form validation

mod controller;
mod form;
mod validate;

pub use controller::{
    MutationController, MutationEndpoint, SubmitOutcome, DEFAULT_PASSWORD_NOTE,
    DEFAULT_SUCCESS_MESSAGE,
};
pub use form::{FormMode, MutationFormState};
pub use validate::{
    as_number, is_valid_email, validate, Check, FieldError, FieldRule, FormFields, FormSchema,
    ValidationErrors,
};
