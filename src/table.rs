//! Table and field catalog types
//!
//! A `Table` is a named tabular entity within a data source; a `Field` is one
//! of its columns. Field types come from a closed vocabulary; only `uuid` and
//! `reference` fields may participate in relationships.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declared type of a field - closed vocabulary shared by all sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Timestamp,
    Json,
    Array,
    Uuid,
    Reference,
}

impl FieldType {
    /// Get the string representation of the field type
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Timestamp => "timestamp",
            FieldType::Json => "json",
            FieldType::Array => "array",
            FieldType::Uuid => "uuid",
            FieldType::Reference => "reference",
        }
    }

    /// Get all field types
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::String,
            FieldType::Number,
            FieldType::Integer,
            FieldType::Float,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::DateTime,
            FieldType::Timestamp,
            FieldType::Json,
            FieldType::Array,
            FieldType::Uuid,
            FieldType::Reference,
        ]
    }

    /// Whether a field of this type may participate in a relationship.
    ///
    /// Only identifier-like fields connect tables.
    pub fn is_relation_capable(&self) -> bool {
        matches!(self, FieldType::Uuid | FieldType::Reference)
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "string" | "str" | "text" | "varchar" => Ok(FieldType::String),
            "number" | "numeric" | "decimal" => Ok(FieldType::Number),
            "integer" | "int" | "bigint" => Ok(FieldType::Integer),
            "float" | "double" | "real" => Ok(FieldType::Float),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "date" => Ok(FieldType::Date),
            "datetime" => Ok(FieldType::DateTime),
            "timestamp" => Ok(FieldType::Timestamp),
            "json" | "object" => Ok(FieldType::Json),
            "array" | "list" => Ok(FieldType::Array),
            "uuid" | "guid" => Ok(FieldType::Uuid),
            "reference" | "ref" | "fk" => Ok(FieldType::Reference),
            _ => Err(Error::UnknownFieldType(s.to_string())),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cataloged table.
///
/// Identity is immutable; the name may be changed by an external editor but
/// must stay unique within its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Unique identifier for this table
    pub id: String,
    /// Table name, unique within a source
    pub name: String,
    /// The data source this table belongs to
    pub source: String,
}

impl Table {
    /// Create a new table with a fresh identifier
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            source: source.into(),
        }
    }
}

/// A cataloged field (column) of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Unique identifier for this field
    pub id: String,
    /// Identifier of the owning table
    pub table_id: String,
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Alternative names (uniqueness not enforced)
    #[serde(default)]
    pub alternative_names: Vec<String>,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl Field {
    /// Create a new field with a fresh identifier
    pub fn new(
        table_id: impl Into<String>,
        name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            table_id: table_id.into(),
            name: name.into(),
            field_type,
            alternative_names: Vec::new(),
            description: None,
        }
    }

    /// Whether this field may participate in a relationship
    pub fn is_relation_capable(&self) -> bool {
        self.field_type.is_relation_capable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_roundtrip() {
        for ft in FieldType::all() {
            let s = ft.as_str();
            let parsed: FieldType = s.parse().unwrap();
            assert_eq!(*ft, parsed);
        }
    }

    #[test]
    fn test_field_type_synonyms() {
        assert_eq!("varchar".parse::<FieldType>().unwrap(), FieldType::String);
        assert_eq!("fk".parse::<FieldType>().unwrap(), FieldType::Reference);
        assert!("blob".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_relation_capable_fields() {
        let table = Table::new("users", "warehouse");
        let id_field = Field::new(&table.id, "id", FieldType::Uuid);
        let name_field = Field::new(&table.id, "name", FieldType::String);

        assert!(id_field.is_relation_capable());
        assert!(!name_field.is_relation_capable());
    }
}
