//! Field-level validation for employee and attendance payloads.
//!
//! Validators are pure: they take the raw request fields (plus the current
//! date where relevant) and return either normalized values or a
//! [`FieldErrors`] map keyed by field name.

pub mod attendance;
pub mod employee;

use serde::Serialize;
use std::collections::BTreeMap;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Reasons keyed by field name, serialized as `{"field": ["reason", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, reason);
        errors
    }

    pub fn non_field(reason: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, reason)
    }

    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Trims a required string field and checks it is present, non-blank and
/// within `max_len` characters. Records the reason and returns `None` on failure.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    let Some(raw) = value else {
        errors.add(field, REQUIRED);
        return None;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }

    if trimmed.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
        return None;
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_reports_each_failure() {
        let mut errors = FieldErrors::new();

        assert_eq!(required_text(&mut errors, "a", Some("  ok "), 5).as_deref(), Some("ok"));
        assert_eq!(required_text(&mut errors, "b", None, 5), None);
        assert_eq!(required_text(&mut errors, "c", Some("   "), 5), None);
        assert_eq!(required_text(&mut errors, "d", Some("toolong"), 5), None);

        assert!(!errors.contains("a"));
        assert_eq!(errors.get("b"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("c"), Some(&[BLANK.to_string()][..]));
        assert_eq!(
            errors.get("d"),
            Some(&["Ensure this field has no more than 5 characters.".to_string()][..])
        );
    }

    #[test]
    fn serializes_as_field_keyed_lists() {
        let mut errors = FieldErrors::single("email", "bad");
        errors.add(NON_FIELD_ERRORS, "clash");

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"email": ["bad"], "non_field_errors": ["clash"]})
        );
    }
}
