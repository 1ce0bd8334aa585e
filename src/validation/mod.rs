//! Request validation
//!
//! Turns raw JSON bodies into typed records, collecting every field-level
//! violation instead of stopping at the first one.

mod query;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::time;
use crate::models::Choice;

pub use query::QueryReader;

/// Field name -> list of messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MISSING: &str = "Missing data for required field.";
pub const NOT_NULL: &str = "Field may not be null.";
pub const UNKNOWN: &str = "Unknown field.";

/// Key used for errors that concern the payload as a whole
pub const SCHEMA_KEY: &str = "_schema";

/// A request payload failed validation
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid request data")]
pub struct ValidationError {
    pub fields: FieldErrors,
}

impl ValidationError {
    pub fn new(fields: FieldErrors) -> Self {
        Self { fields }
    }

    /// Error with a single message on one field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self { fields }
    }

    /// Messages recorded for a field
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Typed input built from a JSON request body
pub trait FromJson: Sized {
    fn from_json(body: &Value) -> Result<Self, ValidationError>;
}

/// Value of a field in a partial update
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Not supplied, keep the stored value
    Absent,
    /// Explicit null, clear the stored value
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

/// Field-by-field reader over a JSON object body
pub struct Validator<'a> {
    body: &'a Map<String, Value>,
    seen: Vec<&'static str>,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    /// Start validating a body, which must be a JSON object
    pub fn new(body: &'a Value) -> Result<Self, ValidationError> {
        match body {
            Value::Object(map) => Ok(Self {
                body: map,
                seen: Vec::new(),
                errors: FieldErrors::new(),
            }),
            _ => Err(ValidationError::single(SCHEMA_KEY, "Invalid input type.")),
        }
    }

    /// Record an error against a field
    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn take(&mut self, field: &'static str) -> Option<&'a Value> {
        self.seen.push(field);
        self.body.get(field)
    }

    fn parse<T>(
        &mut self,
        field: &'static str,
        value: &Value,
        parse: impl Fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.error(field, message);
                None
            }
        }
    }

    /// A field that must be present and non-null
    pub fn required<T>(
        &mut self,
        field: &'static str,
        parse: impl Fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.take(field) {
            None => {
                self.error(field, MISSING);
                None
            }
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                None
            }
            Some(value) => self.parse(field, value, parse),
        }
    }

    /// A nullable field; absent and null both read as `None`
    pub fn optional<T>(
        &mut self,
        field: &'static str,
        parse: impl Fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.take(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.parse(field, value, parse),
        }
    }

    /// A non-nullable field that falls back to `default` when absent
    pub fn or_default<T>(
        &mut self,
        field: &'static str,
        default: T,
        parse: impl Fn(&Value) -> Result<T, String>,
    ) -> T {
        match self.take(field) {
            None => default,
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                default
            }
            Some(value) => self.parse(field, value, parse).unwrap_or(default),
        }
    }

    /// A field of a partial update; `nullable` decides whether null may clear it
    pub fn patch<T>(
        &mut self,
        field: &'static str,
        nullable: bool,
        parse: impl Fn(&Value) -> Result<T, String>,
    ) -> Patch<T> {
        match self.take(field) {
            None => Patch::Absent,
            Some(Value::Null) if nullable => Patch::Null,
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                Patch::Absent
            }
            Some(value) => match self.parse(field, value, parse) {
                Some(parsed) => Patch::Set(parsed),
                None => Patch::Absent,
            },
        }
    }

    /// Reject unknown fields, then build the record if nothing failed
    pub fn finish<T>(mut self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationError> {
        let unknown: Vec<String> = self
            .body
            .keys()
            .filter(|key| !self.seen.iter().any(|seen| *seen == key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            self.error(&key, UNKNOWN);
        }

        if !self.errors.is_empty() {
            return Err(ValidationError::new(self.errors));
        }

        build().ok_or_else(|| ValidationError::single(SCHEMA_KEY, "Invalid input."))
    }
}

// ============================================================================
// Field parsers
// ============================================================================

pub fn string(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "Not a valid string.".to_string())
}

pub fn non_empty_string(value: &Value) -> Result<String, String> {
    let s = string(value)?;
    if s.is_empty() {
        return Err("Shorter than minimum length 1.".to_string());
    }
    Ok(s)
}

pub fn choice<C: Choice>(value: &Value) -> Result<C, String> {
    value
        .as_str()
        .and_then(C::parse)
        .ok_or_else(C::invalid_message)
}

pub fn date(value: &Value) -> Result<NaiveDate, String> {
    value
        .as_str()
        .and_then(time::parse_date)
        .ok_or_else(|| "Not a valid date.".to_string())
}

pub fn number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| "Not a valid number.".to_string()),
        _ => Err("Not a valid number.".to_string()),
    }
}

pub fn non_negative_number(value: &Value) -> Result<f64, String> {
    let n = number(value)?;
    if n < 0.0 {
        return Err("Must be greater than or equal to 0.".to_string());
    }
    Ok(n)
}

pub fn integer(value: &Value) -> Result<i64, String> {
    let invalid = || "Not a valid integer.".to_string();
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Integer parser with inclusive bounds
pub fn integer_in(min: Option<i64>, max: Option<i64>) -> impl Fn(&Value) -> Result<i64, String> {
    move |value| {
        let n = integer(value)?;
        if min.map_or(false, |lo| n < lo) || max.map_or(false, |hi| n > hi) {
            return Err(range_message(min, max));
        }
        Ok(n)
    }
}

pub fn non_negative_integer(value: &Value) -> Result<i64, String> {
    integer_in(Some(0), None)(value)
}

pub(crate) fn range_message(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!(
            "Must be greater than or equal to {} and less than or equal to {}.",
            lo, hi
        ),
        (Some(lo), None) => format!("Must be greater than or equal to {}.", lo),
        (None, Some(hi)) => format!("Must be less than or equal to {}.", hi),
        (None, None) => "Invalid value.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use serde_json::json;

    #[test]
    fn test_collects_every_failing_field() {
        let body = json!({"age": "ten", "extra": 1});
        let mut v = Validator::new(&body).unwrap();
        let name = v.required("name", string);
        let age = v.required("age", integer);
        let result = v.finish(|| Some((name?, age?)));

        let err = result.unwrap_err();
        assert_eq!(err.messages("name"), [MISSING]);
        assert_eq!(err.messages("age"), ["Not a valid integer."]);
        assert_eq!(err.messages("extra"), [UNKNOWN]);
    }

    #[test]
    fn test_non_object_body_is_schema_error() {
        let body = json!([1, 2]);
        let err = Validator::new(&body).err().unwrap();
        assert_eq!(err.messages(SCHEMA_KEY), ["Invalid input type."]);
    }

    #[test]
    fn test_patch_distinguishes_absent_null_and_set() {
        let body = json!({"notes": null, "mood_note": "ok"});
        let mut v = Validator::new(&body).unwrap();
        assert_eq!(v.patch("notes", true, string), Patch::Null);
        assert_eq!(v.patch("mood_note", true, string), Patch::Set("ok".to_string()));
        assert_eq!(v.patch("missing", true, string), Patch::<String>::Absent);
        assert!(v.finish(|| Some(())).is_ok());
    }

    #[test]
    fn test_patch_rejects_null_on_non_nullable_field() {
        let body = json!({"name": null});
        let mut v = Validator::new(&body).unwrap();
        assert_eq!(v.patch("name", false, string), Patch::Absent);
        let err = v.finish(|| Some(())).unwrap_err();
        assert_eq!(err.messages("name"), [NOT_NULL]);
    }

    #[test]
    fn test_choice_is_case_sensitive_and_names_allowed_set() {
        assert_eq!(choice::<Gender>(&json!("F")), Ok(Gender::F));
        assert_eq!(
            choice::<Gender>(&json!("f")),
            Err("Must be one of: M, F.".to_string())
        );
    }

    #[test]
    fn test_numeric_parsers() {
        assert_eq!(non_negative_number(&json!(1.5)), Ok(1.5));
        assert_eq!(non_negative_number(&json!(0)), Ok(0.0));
        assert!(non_negative_number(&json!(-0.5)).is_err());
        assert!(non_negative_number(&json!("2")).is_err());
        assert!(non_negative_number(&json!(true)).is_err());

        let meals = integer_in(Some(1), Some(10));
        assert_eq!(meals(&json!(3)), Ok(3));
        assert_eq!(meals(&json!(4.0)), Ok(4));
        assert_eq!(
            meals(&json!(11)),
            Err("Must be greater than or equal to 1 and less than or equal to 10.".to_string())
        );
        assert_eq!(meals(&json!(2.5)), Err("Not a valid integer.".to_string()));
    }

    #[test]
    fn test_date_parser() {
        assert_eq!(
            date(&json!("2020-02-29")),
            Ok(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())
        );
        assert_eq!(date(&json!("2021-02-29")), Err("Not a valid date.".to_string()));
        assert_eq!(date(&json!("29/02/2020")), Err("Not a valid date.".to_string()));
    }

    #[test]
    fn test_or_default_uses_default_when_absent() {
        let body = json!({});
        let mut v = Validator::new(&body).unwrap();
        assert_eq!(v.or_default("servings_fruit", 0.0, non_negative_number), 0.0);
        assert!(v.finish(|| Some(())).is_ok());
    }
}
