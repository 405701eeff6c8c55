//! Field-level validation errors for form submissions.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A set of validation failures keyed by field name.
///
/// Each field keeps only its first error so messages line up one-to-one with
/// form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless one is already present.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| message.into());
    }

    /// Record a "required" error when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{field} is required"));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Field names with errors, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fold another set of errors into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }

    /// `Ok(())` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed validation.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields().collect::<Vec<_>>().join(", ");
        write!(f, "validation failed for {fields}")
    }
}

impl std::error::Error for ValidationErrors {}
