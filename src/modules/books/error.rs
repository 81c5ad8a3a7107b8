//! Error taxonomy for book record validation and catalog loading

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// A single schema violation on one field of a raw record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Field path (e.g. "price" or "author2.name")
    pub field: String,
    /// Human-readable reason
    pub message: String,
    /// Offending raw value, `null` when the field was absent
    pub value: Value,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "field required", Value::Null)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "none is not an allowed value", Value::Null)
    }

    /// Prefix the field path, used when reporting errors from nested records.
    pub fn nested(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every way a single book record can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    /// Neither `isbn_10` nor `isbn_13` was supplied.
    #[error("{message} (title: {title:?})")]
    IsbnMissing { title: String, message: String },

    /// `isbn_10` has the wrong digit count or fails the mod-11 checksum.
    #[error("{message} (value: {value:?})")]
    Isbn10Format { value: String, message: String },

    /// One or more fields failed type coercion.
    #[error("{} validation error(s): {}", .details.len(), join_details(.details))]
    Schema { details: Vec<FieldViolation> },

    /// A field assignment was attempted on a validated record.
    #[error("\"{field}\" is immutable and does not support item assignment")]
    Immutable { field: String },
}

impl BookError {
    pub fn isbn_missing(title: impl Into<String>) -> Self {
        Self::IsbnMissing {
            title: title.into(),
            message: "Document should have either an ISBN10 or ISBN13".to_string(),
        }
    }

    pub fn isbn10_digit_count(value: impl Into<String>) -> Self {
        Self::Isbn10Format {
            value: value.into(),
            message: "ISBN10 should be 10 digits.".to_string(),
        }
    }

    pub fn isbn10_checksum(value: impl Into<String>) -> Self {
        Self::Isbn10Format {
            value: value.into(),
            message: "ISBN10 digit sum should be divisible by 11.".to_string(),
        }
    }

    pub fn schema(details: Vec<FieldViolation>) -> Self {
        Self::Schema { details }
    }

    pub fn immutable(field: impl Into<String>) -> Self {
        Self::Immutable {
            field: field.into(),
        }
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            BookError::IsbnMissing { .. } => "isbn_missing",
            BookError::Isbn10Format { .. } => "isbn10_format",
            BookError::Schema { .. } => "validation_error",
            BookError::Immutable { .. } => "immutable_field",
        }
    }

    /// Render the error in the `{"error": {code, message, details}}` shape.
    pub fn to_body(&self) -> Value {
        let (message, details) = match self {
            BookError::IsbnMissing { title, message } => {
                (message.clone(), vec![json!({ "title": title })])
            }
            BookError::Isbn10Format { value, message } => (
                message.clone(),
                vec![json!({ "field": "isbn_10", "value": value })],
            ),
            BookError::Schema { details } => (
                "record failed schema validation".to_string(),
                details
                    .iter()
                    .map(|d| serde_json::to_value(d).unwrap_or(Value::Null))
                    .collect(),
            ),
            BookError::Immutable { field } => {
                (self.to_string(), vec![json!({ "field": field })])
            }
        };

        json!({
            "error": {
                "code": self.code(),
                "message": message,
                "details": details,
            }
        })
    }
}

fn join_details(details: &[FieldViolation]) -> String {
    details
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures while reading a whole catalog of records.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("catalog must be a JSON array of records, found {found}")]
    NotAnArray { found: &'static str },

    #[error("record {index} is invalid: {source}")]
    Record {
        index: usize,
        #[source]
        source: BookError,
    },
}

impl CatalogError {
    /// The record-level error, when the failure came from validation
    pub fn book_error(&self) -> Option<&BookError> {
        match self {
            CatalogError::Record { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Render the error in the same body shape as [`BookError::to_body`].
    pub fn to_body(&self) -> Value {
        match self {
            CatalogError::Record { index, source } => {
                let mut body = source.to_body();
                body["error"]["index"] = json!(index);
                body
            }
            other => json!({
                "error": {
                    "code": "catalog_error",
                    "message": other.to_string(),
                    "details": [],
                }
            }),
        }
    }
}
