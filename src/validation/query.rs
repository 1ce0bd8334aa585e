//! Query-string parameter parsing
//!
//! Query values arrive as raw strings; blank values count as absent.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::{range_message, FieldErrors, ValidationError, MISSING};
use crate::models::time;
use crate::models::Choice;

/// Reads optional filter parameters, collecting errors like [`super::Validator`]
pub struct QueryReader<'a> {
    params: &'a HashMap<String, String>,
    errors: FieldErrors,
}

impl<'a> QueryReader<'a> {
    pub fn new(params: &'a HashMap<String, String>) -> Self {
        Self {
            params,
            errors: FieldErrors::new(),
        }
    }

    fn raw(&self, name: &str) -> Option<&'a str> {
        self.params
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn error(&mut self, name: &str, message: impl Into<String>) {
        self.errors
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    /// Comma-separated integer list such as `1,2,3`.
    ///
    /// Blank tokens are skipped; any other non-integer token is an error.
    pub fn id_list(&mut self, name: &str) -> Option<Vec<i64>> {
        let raw = self.raw(name)?;

        let mut ids = Vec::new();
        let mut invalid = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => invalid.push(token),
            }
        }

        if !invalid.is_empty() {
            self.error(
                name,
                format!("Not a valid list of integer ids: {}.", invalid.join(", ")),
            );
            return None;
        }

        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        self.raw(name).map(str::to_string)
    }

    pub fn choice<C: Choice>(&mut self, name: &str) -> Option<C> {
        let raw = self.raw(name)?;
        match C::parse(raw) {
            Some(value) => Some(value),
            None => {
                self.error(name, C::invalid_message());
                None
            }
        }
    }

    /// Integer with inclusive bounds
    pub fn integer(&mut self, name: &str, min: Option<i64>, max: Option<i64>) -> Option<i64> {
        let raw = self.raw(name)?;
        let Ok(value) = raw.parse::<i64>() else {
            self.error(name, "Not a valid integer.");
            return None;
        };
        if min.map_or(false, |lo| value < lo) || max.map_or(false, |hi| value > hi) {
            self.error(name, range_message(min, max));
            return None;
        }
        Some(value)
    }

    /// ISO 8601 timestamp, normalized to UTC
    pub fn timestamp(&mut self, name: &str, required: bool) -> Option<NaiveDateTime> {
        let Some(raw) = self.raw(name) else {
            if required {
                self.error(name, MISSING);
            }
            return None;
        };
        match time::parse_timestamp(raw) {
            Some(ts) => Some(ts),
            None => {
                self.error(name, "Not a valid datetime.");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.errors))
        }
    }
}
