//! Configuration for the filter compiler.
//!
//! Configuration can be built in code, or loaded from YAML or JSON so that
//! deployments can tune LIKE defaults and case handling without a rebuild.
//!
//! # Examples
//!
//! ```rust
//! use ogc_filter::CompilerConfig;
//!
//! let config = CompilerConfig::from_yaml_str(
//!     r#"
//! match_case_default: true
//! like:
//!   wild_card: "%"
//!   single_char: "_"
//!   escape_char: "!"
//! "#,
//! )?;
//!
//! assert!(config.match_case_default);
//! assert_eq!(config.like.wild_card, '%');
//! # Ok::<(), ogc_filter::FilterError>(())
//! ```

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default characters used by `PropertyIsLike` when the element omits them.
///
/// These mirror the values filter editors emit: `*` for any run of
/// characters, `.` for exactly one, and a backslash as the escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LikeDefaults {
    /// Matches zero or more characters.
    pub wild_card: char,
    /// Matches exactly one character.
    pub single_char: char,
    /// Escapes the next character so it is taken literally.
    pub escape_char: char,
}

impl Default for LikeDefaults {
    fn default() -> Self {
        Self {
            wild_card: '*',
            single_char: '.',
            escape_char: '\\',
        }
    }
}

/// Configuration for parallel batch filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Batches smaller than this are filtered on the calling thread.
    pub min_batch_size_for_parallelism: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_batch_size_for_parallelism: 1024,
        }
    }
}

/// Top-level compiler configuration.
///
/// | Field | Default | Effect |
/// |-------|---------|--------|
/// | `match_case_default` | `false` | Case sensitivity when a condition has no `matchCase` attribute |
/// | `filter_wrapper_as_and` | `true` | Compile an OGC `<Filter>` root as an implicit `And` |
/// | `property_element` | `PropertyName` | Local name of the element carrying property references |
/// | `like` | `* . \` | Wildcards for `PropertyIsLike` |
/// | `parallel` | 1024 | Threshold for rayon batch filtering |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub match_case_default: bool,
    pub filter_wrapper_as_and: bool,
    pub property_element: String,
    pub like: LikeDefaults,
    pub parallel: ParallelConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            match_case_default: false,
            filter_wrapper_as_and: true,
            property_element: "PropertyName".to_string(),
            like: LikeDefaults::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl CompilerConfig {
    /// Parse a configuration from YAML. Missing keys fall back to defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON. Missing keys fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format from its extension.
    ///
    /// `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Check the configuration for values the compiler cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.property_element.trim().is_empty() {
            return Err(FilterError::InvalidConfig(
                "property_element must not be blank".to_string(),
            ));
        }

        let LikeDefaults {
            wild_card,
            single_char,
            escape_char,
        } = self.like;
        if wild_card == single_char || wild_card == escape_char || single_char == escape_char {
            return Err(FilterError::InvalidConfig(format!(
                "LIKE characters must be distinct (wild_card={wild_card:?}, single_char={single_char:?}, escape_char={escape_char:?})"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert!(!config.match_case_default);
        assert!(config.filter_wrapper_as_and);
        assert_eq!(config.property_element, "PropertyName");
        assert_eq!(config.like, LikeDefaults::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = CompilerConfig::from_yaml_str("match_case_default: true").unwrap();
        assert!(config.match_case_default);
        assert_eq!(config.like.wild_card, '*');
        assert_eq!(config.parallel.min_batch_size_for_parallelism, 1024);
    }

    #[test]
    fn test_json_config() {
        let config = CompilerConfig::from_json_str(
            r#"{"filter_wrapper_as_and": false, "like": {"wild_card": "%"}}"#,
        )
        .unwrap();
        assert!(!config.filter_wrapper_as_and);
        assert_eq!(config.like.wild_card, '%');
        assert_eq!(config.like.single_char, '.');
    }

    #[test]
    fn test_rejects_blank_property_element() {
        let result = CompilerConfig::from_yaml_str("property_element: '  '");
        assert!(matches!(result, Err(FilterError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_duplicate_like_characters() {
        let result = CompilerConfig::from_yaml_str("like:\n  wild_card: '.'\n");
        assert!(matches!(result, Err(FilterError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = CompilerConfig::from_yaml_str("like: [");
        assert!(matches!(result, Err(FilterError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "match_case_default: true").unwrap();
        let config = CompilerConfig::from_file(yaml.path()).unwrap();
        assert!(config.match_case_default);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, r#"{{"property_element": "ValueReference"}}"#).unwrap();
        let config = CompilerConfig::from_file(json.path()).unwrap();
        assert_eq!(config.property_element, "ValueReference");
    }

    #[test]
    fn test_missing_file() {
        let result = CompilerConfig::from_file("/nonexistent/filter-config.yml");
        assert!(matches!(result, Err(FilterError::IoError(_))));
    }
}
