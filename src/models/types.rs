//! Neutral model types and their mapping from native database types

use serde::{Deserialize, Serialize};

/// Language-neutral type of an attribute, used by templates to pick the
/// target language type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeutralType {
    String,
    Byte,
    Short,
    Int,
    Long,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    Time,
    Timestamp,
    Binary,
}

impl NeutralType {
    /// Map a native database type name ("VARCHAR", "numeric(10,2)", ...)
    pub fn from_native(type_name: &str) -> Self {
        let normalized = type_name.to_lowercase();
        let base = normalized.split('(').next().unwrap_or(&normalized).trim();

        match base {
            "char" | "character" | "varchar" | "character varying" | "varchar2" | "nchar"
            | "nvarchar" | "nvarchar2" | "text" | "tinytext" | "mediumtext" | "longtext"
            | "clob" | "nclob" | "longvarchar" | "longnvarchar" | "uuid" | "json" | "jsonb"
            | "xml" | "enum" => NeutralType::String,
            "tinyint" => NeutralType::Byte,
            "smallint" | "int2" => NeutralType::Short,
            "int" | "integer" | "int4" | "mediumint" | "serial" => NeutralType::Int,
            "bigint" | "int8" | "bigserial" => NeutralType::Long,
            "decimal" | "numeric" | "number" | "money" => NeutralType::Decimal,
            "real" | "float4" => NeutralType::Float,
            "float" | "double" | "double precision" | "float8" => NeutralType::Double,
            "boolean" | "bool" | "bit" => NeutralType::Boolean,
            "date" => NeutralType::Date,
            "time" | "time with time zone" | "time without time zone" | "timetz" => NeutralType::Time,
            "timestamp" | "timestamp with time zone" | "timestamp without time zone"
            | "timestamptz" | "datetime" | "datetime2" | "smalldatetime" => NeutralType::Timestamp,
            "blob" | "binary" | "varbinary" | "longvarbinary" | "bytea" | "image" | "raw"
            | "longblob" | "mediumblob" | "tinyblob" => NeutralType::Binary,
            _ => NeutralType::String,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, NeutralType::String)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, NeutralType::Boolean)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            NeutralType::Byte
                | NeutralType::Short
                | NeutralType::Int
                | NeutralType::Long
                | NeutralType::Decimal
                | NeutralType::Float
                | NeutralType::Double
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, NeutralType::Date | NeutralType::Time | NeutralType::Timestamp)
    }

    /// Default date category for temporal types
    pub fn date_type(&self) -> Option<DateType> {
        match self {
            NeutralType::Date => Some(DateType::DateOnly),
            NeutralType::Time => Some(DateType::TimeOnly),
            NeutralType::Timestamp => Some(DateType::DateAndTime),
            _ => None,
        }
    }
}

/// Returns true for the native types usually holding long texts
pub fn is_long_text_native(type_name: &str) -> bool {
    let lower = type_name.to_lowercase();
    matches!(
        lower.split('(').next().unwrap_or("").trim(),
        "clob" | "nclob" | "text" | "mediumtext" | "longtext" | "longvarchar" | "longnvarchar"
    )
}

/// Date category of a temporal attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateType {
    #[serde(rename = "D")]
    DateOnly,
    #[serde(rename = "T")]
    TimeOnly,
    #[serde(rename = "DT")]
    DateAndTime,
}

impl DateType {
    pub fn label(&self) -> &'static str {
        match self {
            DateType::DateOnly => "Date only",
            DateType::TimeOnly => "Time only",
            DateType::DateAndTime => "Date & Time",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_mapping_ignores_case_and_size() {
        assert_eq!(NeutralType::from_native("VARCHAR(20)"), NeutralType::String);
        assert_eq!(NeutralType::from_native("Numeric(10,2)"), NeutralType::Decimal);
        assert_eq!(NeutralType::from_native("INTEGER"), NeutralType::Int);
        assert_eq!(NeutralType::from_native("timestamp with time zone"), NeutralType::Timestamp);
        assert_eq!(NeutralType::from_native("GEOMETRY"), NeutralType::String);
    }

    #[test]
    fn test_categories() {
        assert!(NeutralType::Long.is_number());
        assert!(!NeutralType::Boolean.is_number());
        assert!(NeutralType::Time.is_temporal());
        assert_eq!(NeutralType::Date.date_type(), Some(DateType::DateOnly));
        assert_eq!(NeutralType::Int.date_type(), None);
        assert!(is_long_text_native("CLOB"));
        assert!(!is_long_text_native("VARCHAR"));
    }

    #[test]
    fn test_date_type_serialized_as_short_code() {
        assert_eq!(serde_json::to_string(&DateType::DateAndTime).unwrap(), "\"DT\"");
    }
}
