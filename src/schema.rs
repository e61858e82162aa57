// Shape Layer - Field Validation
// Gates raw request fields before they reach the record model:
// required fields, whitelisted names, and type coercion per entity.

use crate::error::{CatalogError, Result};
use chrono::NaiveDate;
use rusqlite::types::{ToSql, ToSqlOutput};
use std::collections::BTreeMap;

/// Textual date format accepted and rendered for date fields (DD.MM.YYYY)
pub const DATE_FORMAT: &str = "%d.%m.%Y";

const DATE_FORMAT_HINT: &str = "DD.MM.YYYY";

/// Raw key/value pairs as they arrive from a form or a CSV row
pub type RawFields = BTreeMap<String, String>;

/// Coerced field values keyed by their (static) column name
pub type FieldSet = BTreeMap<&'static str, FieldValue>;

// ============================================================================
// FIELD TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    /// Parsed with `DATE_FORMAT`
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Text(value) => value.to_sql(),
            FieldValue::Integer(value) => value.to_sql(),
            FieldValue::Date(value) => value.to_sql(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Must be present on create
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        FieldSpec {
            name,
            field_type,
            required: true,
        }
    }

    /// Coerce a raw string into this field's type
    pub fn coerce(&self, raw: &str) -> Result<FieldValue> {
        match self.field_type {
            FieldType::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| must_be_integer(self.name)),
            FieldType::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(FieldValue::Date)
                .map_err(|_| CatalogError::InvalidValue {
                    field: self.name.to_string(),
                    message: format!("Date must be in {} format", DATE_FORMAT_HINT),
                }),
        }
    }
}

// ============================================================================
// ENTITY SCHEMA
// ============================================================================

/// Static description of one entity kind: its table and whitelisted fields.
/// `id` is always accepted on input in addition to `fields`.
#[derive(Debug)]
pub struct EntitySchema {
    /// Human-readable kind name ("Actor", "Movie")
    pub kind: &'static str,
    pub table: &'static str,
    /// Scalar fields in column order (identity excluded)
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|spec| spec.name).collect()
    }

    /// Whether `name` may appear in a request for this entity
    pub fn allows(&self, name: &str) -> bool {
        name == "id" || self.field(name).is_some()
    }

    /// Validate input for a create call.
    ///
    /// Checks run in order: empty input, missing required fields,
    /// disallowed field names, then coercion. A supplied `id` must still be
    /// an integer, but its value is dropped; identity is assigned by the store.
    pub fn validate_create(&self, raw: &RawFields) -> Result<FieldSet> {
        if raw.is_empty() {
            return Err(CatalogError::EmptyInput);
        }

        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|spec| spec.required && !raw.contains_key(spec.name))
            .map(|spec| spec.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::MissingFields(missing));
        }

        self.reject_unknown(raw)?;
        if raw.contains_key("id") {
            parse_id(raw, "id")?;
        }
        self.coerce_present(raw)
    }

    /// Validate input for an update call, returning the target id and the
    /// coerced subset of fields that were supplied.
    pub fn validate_update(&self, raw: &RawFields) -> Result<(i64, FieldSet)> {
        let id = parse_id(raw, "id")?;
        self.reject_unknown(raw)?;
        Ok((id, self.coerce_present(raw)?))
    }

    fn reject_unknown(&self, raw: &RawFields) -> Result<()> {
        // BTreeMap keys iterate sorted, so the message is stable
        let invalid: Vec<String> = raw
            .keys()
            .filter(|name| !self.allows(name))
            .cloned()
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::InvalidFields(invalid))
        }
    }

    fn coerce_present(&self, raw: &RawFields) -> Result<FieldSet> {
        let mut fields = FieldSet::new();
        for spec in self.fields {
            if let Some(value) = raw.get(spec.name) {
                fields.insert(spec.name, spec.coerce(value)?);
            }
        }
        Ok(fields)
    }
}

/// Parse an identity field (`id`, `relation_id`, ...) as an integer.
pub fn parse_id(raw: &RawFields, key: &str) -> Result<i64> {
    let value = raw
        .get(key)
        .ok_or_else(|| CatalogError::MissingId(key.to_string()))?;

    value.trim().parse::<i64>().map_err(|_| must_be_integer(key))
}

fn must_be_integer(field: &str) -> CatalogError {
    CatalogError::InvalidValue {
        field: field.to_string(),
        message: format!("{} must be an integer", label(field)),
    }
}

/// "relation_id" -> "Relation id"
fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
