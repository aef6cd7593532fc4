//! Typed request validation: a request either becomes a command record or
//! reports every field that is wrong.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|err| format!("{}: {}", err.field, err.message))
            .collect();
        write!(f, "Invalid request ({})", fields.join("; "))
    }
}

impl ValidationErrors {
    pub fn add<S: Into<String>>(&mut self, field: &'static str, message: S) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn check<S: Into<String>>(&mut self, ok: bool, field: &'static str, message: S) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Keeps the parsed value and records the error otherwise.
    pub fn parse<T, E>(&mut self, field: &'static str, res: Result<T, E>) -> Option<T>
    where
        E: fmt::Display,
    {
        match res {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, err.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

pub trait Validate {
    type Command;

    fn validate(self) -> Result<Self::Command, ValidationErrors>;
}

pub fn check_text_len(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        errors.check(
            value.chars().count() <= max,
            field,
            format!("must be at most {} characters", max),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failing_field() {
        let mut errors = ValidationErrors::default();
        errors.check(false, "capacity", "must be positive");
        errors.check(true, "date", "unused");
        let _ = errors.parse::<i32, _>("token", "x".parse::<i32>());

        let err = errors.into_result(()).unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["capacity", "token"]);
        assert!(err.to_string().starts_with("Invalid request (capacity: must be positive; token:"));
    }

    #[test]
    fn no_errors_yields_the_command() {
        assert_eq!(ValidationErrors::default().into_result(7).unwrap(), 7);
    }

    #[test]
    fn text_length_counts_characters() {
        let mut errors = ValidationErrors::default();
        check_text_len(&mut errors, "notes", Some("héllo"), 5);
        check_text_len(&mut errors, "notes", None, 0);
        assert!(errors.is_empty());

        check_text_len(&mut errors, "notes", Some("héllo!"), 5);
        assert_eq!(errors.fields.len(), 1);
    }
}
