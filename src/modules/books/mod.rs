//! Books module: validated book records and the catalog loader that feeds them.

pub mod error;
pub mod models;
pub mod validation;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;

use crate::utils;

pub use error::{BookError, CatalogError, FieldViolation};
pub use models::{Author, Book};
pub use validation::{check_isbn_10, check_isbn_presence, validate};

/// Read and validate every record in a JSON catalog file.
///
/// The first invalid record aborts the whole load.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Book>, CatalogError> {
    let path = path.as_ref();
    let prefix = utils::log_prefix("books");
    tracing::info!(target: "bookshelf.catalog", %prefix, path = %path.display(), "loading catalog");

    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_catalog(BufReader::new(file))
}

/// Parse a JSON array of raw records from any reader and validate each one.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<Book>, CatalogError> {
    let document: Value = serde_json::from_reader(reader)?;
    validate_records(&document)
}

/// Validate an already parsed catalog document.
pub fn validate_records(document: &Value) -> Result<Vec<Book>, CatalogError> {
    let records = document.as_array().ok_or(CatalogError::NotAnArray {
        found: json_type_name(document),
    })?;

    tracing::debug!(target: "bookshelf.catalog", count = records.len(), "validating records");

    let books = records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            validation::validate(raw).map_err(|source| {
                tracing::error!(
                    target: "bookshelf.catalog",
                    index,
                    error_code = source.code(),
                    "record rejected"
                );
                CatalogError::Record { index, source }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(target: "bookshelf.catalog", count = books.len(), "catalog validated");
    Ok(books)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
