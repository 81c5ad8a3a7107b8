use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::error::{BookError, FieldViolation};
use super::validation;

/// Verified co-author attached to a book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub(super) name: String,
    pub(super) verified: bool,
}

impl Author {
    /// Lower-cased author name, never empty
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verified(&self) -> bool {
        self.verified
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Author(name='{}', verified={})", self.name, self.verified)
    }
}

/// A validated, immutable book record.
///
/// Books are only produced by [`validation::validate`] (directly or through
/// `TryFrom`/`Deserialize`), so every instance carries lower-cased text and a
/// checksum-valid `isbn_10` when one is present. Fields are read through
/// accessors; [`Book::set`] always fails and [`Book::copy_with`] is the only
/// way to derive a modified record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Book {
    pub(super) title: String,
    pub(super) author: String,
    pub(super) publisher: String,
    pub(super) price: f64,
    pub(super) isbn_10: Option<String>,
    pub(super) isbn_13: Option<String>,
    pub(super) subtitle: Option<String>,
    pub(super) author2: Option<Author>,
}

impl Book {
    /// Declared fields, in validation and snapshot order.
    pub const FIELDS: [&'static str; 8] = [
        "title",
        "author",
        "publisher",
        "price",
        "isbn_10",
        "isbn_13",
        "subtitle",
        "author2",
    ];

    /// Validate a raw mapping into a book.
    pub fn from_map(raw: &Map<String, Value>) -> Result<Self, BookError> {
        validation::validate_map(raw)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn isbn_10(&self) -> Option<&str> {
        self.isbn_10.as_deref()
    }

    pub fn isbn_13(&self) -> Option<&str> {
        self.isbn_13.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn author2(&self) -> Option<&Author> {
        self.author2.as_ref()
    }

    /// Full-field snapshot; absent optionals appear as `null`.
    pub fn snapshot(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".into(), Value::from(self.title.as_str()));
        map.insert("author".into(), Value::from(self.author.as_str()));
        map.insert("publisher".into(), Value::from(self.publisher.as_str()));
        map.insert("price".into(), Value::from(self.price));
        map.insert("isbn_10".into(), Value::from(self.isbn_10.clone()));
        map.insert("isbn_13".into(), Value::from(self.isbn_13.clone()));
        map.insert("subtitle".into(), Value::from(self.subtitle.clone()));
        map.insert(
            "author2".into(),
            self.author2
                .as_ref()
                .map(|a| {
                    let mut author = Map::new();
                    author.insert("name".into(), Value::from(a.name.as_str()));
                    author.insert("verified".into(), Value::from(a.verified));
                    Value::Object(author)
                })
                .unwrap_or(Value::Null),
        );
        map
    }

    /// Snapshot without the named fields. Unknown names are ignored.
    pub fn snapshot_excluding(&self, exclude: &[&str]) -> Map<String, Value> {
        let mut map = self.snapshot();
        map.retain(|key, _| !exclude.contains(&key.as_str()));
        map
    }

    /// Identical copy of this record.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy this record, replacing the given fields.
    ///
    /// The merged fields are validated again, so the copy upholds the same
    /// invariants as a freshly loaded record. `self` is never modified.
    pub fn copy_with(&self, overrides: Option<&Map<String, Value>>) -> Result<Self, BookError> {
        let Some(overrides) = overrides else {
            return Ok(self.copy());
        };

        let unknown: Vec<FieldViolation> = overrides
            .iter()
            .filter(|(key, _)| !Self::FIELDS.contains(&key.as_str()))
            .map(|(key, value)| no_such_field(key, value.clone()))
            .collect();
        if !unknown.is_empty() {
            return Err(BookError::schema(unknown));
        }

        let mut merged = self.snapshot();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }

        validation::validate_map(&merged)
    }

    /// Field assignment is rejected on validated records.
    ///
    /// Declared fields fail with [`BookError::Immutable`]; undeclared names
    /// fail as a schema violation. The record is left untouched either way.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), BookError> {
        if Self::FIELDS.contains(&field) {
            tracing::warn!(target: "bookshelf.books", field, "rejected assignment to immutable field");
            return Err(BookError::immutable(field));
        }

        Err(BookError::schema(vec![no_such_field(field, value)]))
    }
}

fn no_such_field(field: &str, value: Value) -> FieldViolation {
    FieldViolation::new(field, format!("object has no field \"{field}\""), value)
}

impl TryFrom<&Value> for Book {
    type Error = BookError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        validation::validate(raw)
    }
}

impl TryFrom<Value> for Book {
    type Error = BookError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        validation::validate(&raw)
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

fn quoted(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{v}'"),
        None => "None".to_string(),
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "title='{}' author='{}' publisher='{}' price={:?} isbn_10={} isbn_13={} subtitle={} author2={}",
            self.title,
            self.author,
            self.publisher,
            self.price,
            quoted(self.isbn_10()),
            quoted(self.isbn_13()),
            quoted(self.subtitle()),
            self.author2
                .as_ref()
                .map_or_else(|| "None".to_string(), ToString::to_string),
        )
    }
}
