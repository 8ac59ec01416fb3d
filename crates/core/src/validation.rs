//! Structural validation for seed data and stored documents.
//!
//! Validation is an explicit validate-then-parse step: raw JSON is parsed into
//! typed values, every value is checked, and the whole document is either
//! accepted or rejected with the complete list of field errors. A document
//! with one bad record is rejected as a whole; valid records from an invalid
//! document are never committed.

use std::collections::HashSet;
use std::fmt;

use serde::de::DeserializeOwned;

/// A single failed check, addressed by a JSON-path-like location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Location of the offending value, e.g. `[3].price`.
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The full set of failures found in a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} validation error(s): {}", .0.len(), format_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// A single error at the document root.
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self(vec![FieldError::new("$", message)])
    }

    /// The individual field errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Structural checks for a typed record.
pub trait Validate {
    /// Append every failed check to `errors`, with paths relative to `path`.
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>);

    /// Keys that must be unique across a collection, as `(name, value)`.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Validate a standalone record.
    ///
    /// # Errors
    ///
    /// Returns every failed check.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        self.validate_into("$", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        let mut seen: HashSet<(&'static str, String)> = HashSet::new();
        for (i, item) in self.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            item.validate_into(&item_path, errors);
            for key in item.unique_keys() {
                if !seen.insert(key.clone()) {
                    errors.push(FieldError::new(
                        format!("{item_path}.{}", key.0),
                        format!("duplicate {} '{}'", key.0, key.1),
                    ));
                }
            }
        }
    }
}

/// Parse a JSON document and validate it as a whole.
///
/// # Errors
///
/// Returns a root error when the text is not JSON or does not have the
/// expected shape, otherwise every failed field check.
pub fn parse_validated<T>(raw: &str) -> Result<T, ValidationErrors>
where
    T: DeserializeOwned + Validate,
{
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ValidationErrors::root(format!("invalid JSON: {e}")))?;
    from_value_validated(value)
}

/// Validate an already-parsed JSON value against the typed schema.
///
/// # Errors
///
/// Same as [`parse_validated`].
pub fn from_value_validated<T>(value: serde_json::Value) -> Result<T, ValidationErrors>
where
    T: DeserializeOwned + Validate,
{
    let typed: T = serde_json::from_value(value)
        .map_err(|e| ValidationErrors::root(format!("schema mismatch: {e}")))?;
    typed.validate()?;
    Ok(typed)
}

// =============================================================================
// Check Helpers
// =============================================================================

/// Require a non-blank string.
pub fn require_text(errors: &mut Vec<FieldError>, path: &str, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(
            format!("{path}.{field}"),
            "must not be empty",
        ));
    }
}

/// Require a non-negative decimal.
pub fn require_non_negative(
    errors: &mut Vec<FieldError>,
    path: &str,
    field: &str,
    value: rust_decimal::Decimal,
) {
    if value < rust_decimal::Decimal::ZERO {
        errors.push(FieldError::new(
            format!("{path}.{field}"),
            "must not be negative",
        ));
    }
}

/// Require a URL-safe slug.
pub fn require_slug(errors: &mut Vec<FieldError>, path: &str, field: &str, value: &str) {
    if !crate::types::is_url_safe_slug(value) {
        errors.push(FieldError::new(
            format!("{path}.{field}"),
            format!("'{value}' is not a URL-safe slug"),
        ));
    }
}
