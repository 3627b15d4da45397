//! Column descriptors used for static filter compatibility checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Decimal,
    DateTime,
    Boolean,
    Geometry,
    Unknown,
}

impl ColumnType {
    /// Classify a type name as reported by a data source.
    ///
    /// Recognises plain names (`string`, `int`, `double`, ...), XML schema
    /// names (`xs:decimal`) and GML geometry property types
    /// (`gml:PointPropertyType`).
    ///
    /// ```rust
    /// use ogc_filter::ColumnType;
    ///
    /// assert_eq!(ColumnType::parse("decimal"), ColumnType::Decimal);
    /// assert_eq!(ColumnType::parse("xs:int"), ColumnType::Integer);
    /// assert_eq!(ColumnType::parse("gml:MultiPolygonPropertyType"), ColumnType::Geometry);
    /// ```
    pub fn parse(type_name: &str) -> Self {
        let lower = type_name.trim().to_ascii_lowercase();

        if lower.starts_with("gml:") || lower.ends_with("propertytype") {
            return Self::Geometry;
        }

        match crate::tree::local_name(&lower) {
            "string" | "str" | "text" | "char" | "varchar" => Self::String,
            "integer" | "int" | "long" | "short" | "byte" | "unsignedint" | "unsignedlong"
            | "unsignedshort" => Self::Integer,
            "decimal" | "double" | "float" | "number" | "real" => Self::Decimal,
            "datetime" | "date" | "time" | "recordtime" => Self::DateTime,
            "boolean" | "bool" => Self::Boolean,
            "geometry" | "geom" | "point" | "linestring" | "polygon" | "multipoint"
            | "multilinestring" | "multipolygon" | "geometrycollection" => Self::Geometry,
            _ => Self::Unknown,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    pub fn is_geometry(self) -> bool {
        self == Self::Geometry
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Geometry => "geometry",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A `{name, type}` column of a target dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Build a column from a raw type name, see [`ColumnType::parse`].
    pub fn from_type_name(name: impl Into<String>, type_name: &str) -> Self {
        Self::new(name, ColumnType::parse(type_name))
    }
}
