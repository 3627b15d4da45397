//! Error types for the filter compiler crate.
//!
//! Compilation itself never fails: malformed filter trees degrade to a
//! predicate that rejects every record. These errors cover the layers
//! around it (loading filter documents, configuration, custom operators).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("XML parsing error: {0}")]
    Xml(String),
    #[error("Empty filter document")]
    EmptyDocument,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
    #[error("Invalid LIKE pattern: {0}")]
    InvalidPattern(String),
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        FilterError::IoError(err.to_string())
    }
}

impl From<quick_xml::Error> for FilterError {
    fn from(err: quick_xml::Error) -> Self {
        FilterError::Xml(err.to_string())
    }
}

impl From<serde_yaml::Error> for FilterError {
    fn from(err: serde_yaml::Error) -> Self {
        FilterError::InvalidConfig(err.to_string())
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::InvalidConfig(err.to_string())
    }
}

impl From<regex::Error> for FilterError {
    fn from(err: regex::Error) -> Self {
        FilterError::InvalidPattern(err.to_string())
    }
}
