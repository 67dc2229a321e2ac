//! Declarative form validation
//!
//! Runs synchronously before any request. `validate` is a pure function of
//! the schema and the field values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Form values keyed by field name
pub type FormFields = BTreeMap<String, Value>;

/// local@domain with at least one dot in the domain
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// One check applied to a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    Required,
    Email,
    /// Inclusive numeric bounds
    NumberRange { min: Option<f64>, max: Option<f64> },
    PositiveInteger,
    MaxLen(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub label: &'static str,
    pub checks: &'static [Check],
}

/// Validation rules of one entity form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormSchema {
    pub fields: &'static [FieldRule],
}

impl FormSchema {
    pub const EMPTY: FormSchema = FormSchema { fields: &[] };

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected field errors, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Absent, null and blank strings count as empty
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Finite numeric value of a field; `NaN` and infinities are not numbers
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_positive_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_u64().is_some_and(|v| v > 0),
        Value::String(s) => s.trim().parse::<u64>().is_ok_and(|v| v > 0),
        _ => false,
    }
}

/// Check every rule; empty optional fields skip their remaining checks
pub fn validate(schema: &FormSchema, fields: &FormFields) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for rule in schema.fields {
        let value = fields.get(rule.name);
        if is_blank(value) {
            if rule.checks.contains(&Check::Required) {
                errors.push(rule.name, format!("{} is required", rule.label));
            }
            continue;
        }
        let Some(value) = value else { continue };

        for check in rule.checks {
            let failed = match check {
                Check::Required => None,
                Check::Email => (!is_valid_email(&as_text(value)))
                    .then(|| format!("{} must be a valid email address", rule.label)),
                Check::NumberRange { min, max } => match as_number(value) {
                    None => Some(format!("{} must be a number", rule.label)),
                    Some(n) if min.is_some_and(|m| n < m) => Some(format!(
                        "{} must be at least {}",
                        rule.label,
                        min.unwrap_or_default()
                    )),
                    Some(n) if max.is_some_and(|m| n > m) => Some(format!(
                        "{} must be at most {}",
                        rule.label,
                        max.unwrap_or_default()
                    )),
                    Some(_) => None,
                },
                Check::PositiveInteger => (!is_positive_integer(value))
                    .then(|| format!("{} must be a positive whole number", rule.label)),
                Check::MaxLen(len) => (as_text(value).chars().count() > *len)
                    .then(|| format!("{} must be at most {} characters", rule.label, len)),
            };
            if let Some(message) = failed {
                errors.push(rule.name, message);
                break;
            }
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: FormSchema = FormSchema {
        fields: &[
            FieldRule {
                name: "name",
                label: "Name",
                checks: &[Check::Required, Check::MaxLen(5)],
            },
            FieldRule {
                name: "email",
                label: "Email",
                checks: &[Check::Required, Check::Email],
            },
            FieldRule {
                name: "commission",
                label: "Commission",
                checks: &[Check::NumberRange { min: Some(0.0), max: Some(100.0) }],
            },
            FieldRule {
                name: "qty",
                label: "Quantity",
                checks: &[Check::PositiveInteger],
            },
        ],
    };

    fn fields(value: serde_json::Value) -> FormFields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email(" user.name@mail.example.com "));
        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("us er@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_required_and_format_errors() {
        let errors = validate(&SCHEMA, &fields(json!({ "name": "  ", "email": "bad-email" })))
            .unwrap_err();
        assert_eq!(errors.for_field("name"), Some("Name is required"));
        assert_eq!(
            errors.for_field("email"),
            Some("Email must be a valid email address")
        );
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn test_numeric_checks() {
        let errors = validate(
            &SCHEMA,
            &fields(json!({ "name": "Ann", "email": "a@b.co", "commission": "-1", "qty": "2.5" })),
        )
        .unwrap_err();
        assert_eq!(errors.for_field("commission"), Some("Commission must be at least 0"));
        assert_eq!(
            errors.for_field("qty"),
            Some("Quantity must be a positive whole number")
        );

        assert!(validate(
            &SCHEMA,
            &fields(json!({ "name": "Ann", "email": "a@b.co", "commission": 20, "qty": "3" })),
        )
        .is_ok());
        assert!(validate(&SCHEMA, &fields(json!({ "name": "Ann", "email": "a@b.co", "qty": 0 })))
            .is_err());
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for raw in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert_eq!(as_number(&json!(raw)), None, "{raw}");
            let errors = validate(
                &SCHEMA,
                &fields(json!({ "name": "Ann", "email": "a@b.co", "commission": raw })),
            )
            .unwrap_err();
            assert_eq!(errors.for_field("commission"), Some("Commission must be a number"));
        }
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        assert!(validate(&SCHEMA, &fields(json!({ "name": "Ann", "email": "a@b.co", "commission": "" })))
            .is_ok());
    }

    #[test]
    fn test_max_len() {
        let errors = validate(&SCHEMA, &fields(json!({ "name": "Too long", "email": "a@b.co" })))
            .unwrap_err();
        assert_eq!(errors.for_field("name"), Some("Name must be at most 5 characters"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let input = fields(json!({ "name": "", "email": "nope", "commission": 500 }));
        let first = validate(&SCHEMA, &input);
        let second = validate(&SCHEMA, &input);
        assert_eq!(first, second);
    }
}
