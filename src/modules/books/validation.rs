//! Record validation for raw book mappings.
//!
//! Construction is two-phase:
//! 1. a pre-check over the raw mapping (an ISBN key must be present)
//! 2. per-field coercion in declaration order, with the ISBN-10 checksum
//!    evaluated on the raw `isbn_10` value
//!
//! Schema violations are collected across all fields and reported together.
//! An ISBN-10 format failure aborts immediately and takes precedence.

use serde_json::{Map, Value};

use super::error::{BookError, FieldViolation};
use super::models::{Author, Book};

const ISBN10_LEN: usize = 10;
const ISBN10_MODULUS: u32 = 11;

/// Validate one raw record and build an immutable [`Book`].
pub fn validate(raw: &Value) -> Result<Book, BookError> {
    let map = raw.as_object().ok_or_else(|| {
        BookError::schema(vec![FieldViolation::new(
            "__root__",
            "value is not a valid dict",
            raw.clone(),
        )])
    })?;

    validate_map(map)
}

/// Validate a raw mapping that is already known to be a JSON object.
pub fn validate_map(raw: &Map<String, Value>) -> Result<Book, BookError> {
    check_isbn_presence(raw)?;

    for key in raw.keys().filter(|key| !Book::FIELDS.contains(&key.as_str())) {
        tracing::debug!(target: "bookshelf.validation", field = %key, "ignoring undeclared field");
    }

    let mut reader = FieldReader::new(raw);

    let title = reader.text("title");
    let author = reader.text("author");
    let publisher = reader.text("publisher");
    let price = reader.float("price");

    let isbn_10 = match reader.optional_raw_text("isbn_10") {
        Some(value) => {
            check_isbn_10(&value)?;
            Some(value.to_lowercase())
        }
        None => None,
    };

    let isbn_13 = reader.optional_text("isbn_13");
    let subtitle = reader.optional_text("subtitle");
    let author2 = reader.optional_author("author2");

    let details = reader.finish();
    match (title, author, publisher, price) {
        (Some(title), Some(author), Some(publisher), Some(price)) if details.is_empty() => {
            Ok(Book {
                title,
                author,
                publisher,
                price,
                isbn_10,
                isbn_13,
                subtitle,
                author2,
            })
        }
        _ => Err(BookError::schema(details)),
    }
}

/// Fail with [`BookError::IsbnMissing`] unless an `isbn_10` or `isbn_13` key exists.
///
/// Runs before any coercion, so the title is reported as supplied.
pub fn check_isbn_presence(raw: &Map<String, Value>) -> Result<(), BookError> {
    if raw.contains_key("isbn_10") || raw.contains_key("isbn_13") {
        return Ok(());
    }

    let title = match raw.get("title") {
        Some(Value::String(title)) => title.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    Err(BookError::isbn_missing(title))
}

/// Verify the ISBN-10 digit count and mod-11 checksum.
///
/// Characters outside `0-9`, `X` and `x` are ignored, so hyphenated forms pass.
pub fn check_isbn_10(value: &str) -> Result<(), BookError> {
    let chars: Vec<char> = value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'X' | 'x'))
        .collect();

    if chars.len() != ISBN10_LEN {
        return Err(BookError::isbn10_digit_count(value));
    }

    if isbn10_weighted_sum(&chars) % ISBN10_MODULUS != 0 {
        return Err(BookError::isbn10_checksum(value));
    }

    Ok(())
}

/// Sum of `(10 - position) * digit` where `X` counts as 10.
fn isbn10_weighted_sum(chars: &[char]) -> u32 {
    chars
        .iter()
        .enumerate()
        .map(|(position, &c)| {
            let digit = match c {
                'X' | 'x' => 10,
                other => other.to_digit(10).unwrap_or(0),
            };
            (ISBN10_LEN - position) as u32 * digit
        })
        .sum()
}

/// Coerce a raw value to text without case normalization.
fn coerce_raw_text(field: &str, value: &Value) -> Result<String, FieldViolation> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "True" } else { "False" }.to_string()),
        other => Err(FieldViolation::new(field, "str type expected", other.clone())),
    }
}

fn coerce_text(field: &str, value: &Value) -> Result<String, FieldViolation> {
    coerce_raw_text(field, value).map(|s| s.to_lowercase())
}

fn coerce_float(field: &str, value: &Value) -> Result<f64, FieldViolation> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| FieldViolation::new(field, "value is not a valid float", value.clone()))
}

fn coerce_bool(field: &str, value: &Value) -> Result<bool, FieldViolation> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => Some(false),
            Some(f) if f == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" | "t" | "y" => Some(true),
            "false" | "no" | "off" | "0" | "f" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    };

    parsed.ok_or_else(|| {
        FieldViolation::new(
            field,
            "value could not be parsed to a boolean",
            value.clone(),
        )
    })
}

/// Text that must not be empty once normalized.
fn coerce_name(field: &str, value: &Value) -> Result<String, FieldViolation> {
    let name = coerce_text(field, value)?;
    if name.is_empty() {
        return Err(FieldViolation::new(
            field,
            "ensure this value has at least 1 characters",
            value.clone(),
        ));
    }
    Ok(name)
}

fn coerce_author(field: &str, value: &Value) -> Result<Author, Vec<FieldViolation>> {
    let map = value.as_object().ok_or_else(|| {
        vec![FieldViolation::new(
            field,
            "value is not a valid dict",
            value.clone(),
        )]
    })?;

    let mut reader = FieldReader::new(map);
    let name = reader.required("name", |f, v| coerce_name(f, v).map_err(|e| vec![e]));
    let verified = reader.boolean("verified");

    let details = reader.finish();
    match (name, verified) {
        (Some(name), Some(verified)) if details.is_empty() => Ok(Author { name, verified }),
        _ => Err(details
            .into_iter()
            .map(|detail| detail.nested(field))
            .collect()),
    }
}

/// Reads fields out of a raw mapping, accumulating violations as it goes.
struct FieldReader<'a> {
    raw: &'a Map<String, Value>,
    errors: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Map<String, Value>) -> Self {
        Self {
            raw,
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Vec<FieldViolation> {
        self.errors
    }

    fn required<T>(
        &mut self,
        field: &str,
        coerce: impl FnOnce(&str, &Value) -> Result<T, Vec<FieldViolation>>,
    ) -> Option<T> {
        match self.raw.get(field) {
            None => {
                self.errors.push(FieldViolation::missing(field));
                None
            }
            Some(Value::Null) => {
                self.errors.push(FieldViolation::null_value(field));
                None
            }
            Some(value) => self.collect(coerce(field, value)),
        }
    }

    fn optional<T>(
        &mut self,
        field: &str,
        coerce: impl FnOnce(&str, &Value) -> Result<T, Vec<FieldViolation>>,
    ) -> Option<T> {
        match self.raw.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.collect(coerce(field, value)),
        }
    }

    fn collect<T>(&mut self, result: Result<T, Vec<FieldViolation>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(mut details) => {
                self.errors.append(&mut details);
                None
            }
        }
    }

    fn text(&mut self, field: &str) -> Option<String> {
        self.required(field, |f, v| coerce_text(f, v).map_err(|e| vec![e]))
    }

    fn float(&mut self, field: &str) -> Option<f64> {
        self.required(field, |f, v| coerce_float(f, v).map_err(|e| vec![e]))
    }

    fn boolean(&mut self, field: &str) -> Option<bool> {
        self.required(field, |f, v| coerce_bool(f, v).map_err(|e| vec![e]))
    }

    fn optional_text(&mut self, field: &str) -> Option<String> {
        self.optional(field, |f, v| coerce_text(f, v).map_err(|e| vec![e]))
    }

    fn optional_raw_text(&mut self, field: &str) -> Option<String> {
        self.optional(field, |f, v| coerce_raw_text(f, v).map_err(|e| vec![e]))
    }

    fn optional_author(&mut self, field: &str) -> Option<Author> {
        self.optional(field, coerce_author)
    }
}
