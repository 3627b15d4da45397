//! Stored filters and their column compatibility checks.
//!
//! A [`FilterEntry`] is a saved filter document plus the metadata a catalog
//! keeps about it. Before an entry is offered for a dataset, callers check it
//! against the dataset's columns with [`FilterEntry::matches`]; this check is
//! static and independent from predicate compilation.

use crate::column::ColumnDefinition;
use crate::compiler::{extract_variables, FilterCompiler};
use crate::tree::FilterNode;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// A stored filter document with catalog metadata.
///
/// The XML is parsed on first use and cached. Deserialized entries parse
/// lazily the same way.
///
/// # Examples
///
/// ```rust
/// use ogc_filter::{ColumnDefinition, ColumnType, FilterEntry};
///
/// let entry = FilterEntry::new(
///     "big-cities",
///     "Big cities",
///     "<Filter><PropertyIsGreaterThan>\
///        <PropertyName>pop</PropertyName><Literal>1000000</Literal>\
///      </PropertyIsGreaterThan></Filter>",
/// );
///
/// assert!(entry.matches(&[ColumnDefinition::new("pop", ColumnType::Integer)]));
/// assert!(!entry.matches(&[ColumnDefinition::new("pop", ColumnType::String)]));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub layer_type: Option<String>,
    filter: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub match_all: bool,
    pub temporary: bool,
    #[serde(skip)]
    tree: OnceLock<Option<FilterNode>>,
}

impl FilterEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        filter_xml: impl Into<String>,
    ) -> Self {
        let mut entry = Self {
            id: id.into(),
            title: title.into(),
            enabled: true,
            ..Self::default()
        };
        entry.set_filter(filter_xml);
        entry
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_layer_type(mut self, layer_type: impl Into<String>) -> Self {
        self.layer_type = Some(layer_type.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw filter document.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Replace the filter document and reparse it.
    ///
    /// Unparsable XML is logged and leaves the entry without a tree; such an
    /// entry compiles to a filter that rejects everything.
    pub fn set_filter(&mut self, filter_xml: impl Into<String>) {
        self.filter = filter_xml.into();
        self.tree = OnceLock::new();
        let _ = self.tree.set(parse_filter(&self.id, &self.filter));
    }

    /// Parsed filter tree, or `None` if the document does not parse.
    pub fn filter_tree(&self) -> Option<&FilterNode> {
        self.tree
            .get_or_init(|| parse_filter(&self.id, &self.filter))
            .as_ref()
    }

    /// Distinct property names the filter references, in document order.
    pub fn property_names(&self) -> Vec<String> {
        let compiler = FilterCompiler::new();
        self.filter_tree()
            .map(|root| {
                extract_variables(root, &compiler.config().property_element)
                    .names()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the filter can be applied to a dataset with these columns,
    /// using the default operators.
    pub fn matches(&self, columns: &[ColumnDefinition]) -> bool {
        self.matches_with(columns, &FilterCompiler::new())
    }

    /// Column compatibility against a compiler's registry and configuration.
    ///
    /// Rejects when the entry has no tree, a referenced property is not a
    /// column, any referenced column is a geometry column (under an operator
    /// or not), an operator does not support the column's type, or a literal
    /// is not valid for it.
    pub fn matches_with(&self, columns: &[ColumnDefinition], compiler: &FilterCompiler) -> bool {
        let Some(root) = self.filter_tree() else {
            return false;
        };

        let property_element = compiler.config().property_element.as_str();
        let column = |name: &str| columns.iter().find(|c| c.name == name);

        for name in extract_variables(root, property_element).names() {
            match column(name) {
                None => {
                    debug!(entry = %self.id, property = name, "filter property is not a column");
                    return false;
                }
                Some(c) if c.column_type.is_geometry() => {
                    debug!(entry = %self.id, property = name, "filter references geometry column");
                    return false;
                }
                Some(_) => {}
            }
        }

        for node in root.descendants() {
            let Some(operator) = compiler.registry().get(node.local_name()) else {
                continue;
            };

            let Some(property) = node
                .descendants()
                .skip(1)
                .find(|n| n.local_name() == property_element)
                .map(|n| n.text().trim())
                .filter(|name| !name.is_empty())
            else {
                continue;
            };
            let Some(column) = column(property) else {
                return false;
            };

            if !operator.supports_column(column.column_type) {
                debug!(
                    entry = %self.id,
                    operator = operator.name(),
                    column = %column.name,
                    column_type = %column.column_type,
                    "operator does not support column"
                );
                return false;
            }

            let literals = node
                .descendants()
                .skip(1)
                .filter(|n| n.local_name() == "Literal")
                .map(|n| n.text().trim());
            for literal in literals {
                if !operator.accepts_literal(literal, column.column_type) {
                    debug!(
                        entry = %self.id,
                        operator = operator.name(),
                        column = %column.name,
                        literal,
                        "literal is not valid for column"
                    );
                    return false;
                }
            }
        }

        true
    }
}

fn enabled_by_default() -> bool {
    true
}

fn parse_filter(id: &str, xml: &str) -> Option<FilterNode> {
    if xml.trim().is_empty() {
        return None;
    }

    match FilterNode::from_xml(xml) {
        Ok(tree) => Some(tree),
        Err(err) => {
            warn!(entry = id, error = %err, "failed to parse filter document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    fn entry(body: &str) -> FilterEntry {
        FilterEntry::new("e1", "Entry", format!("<Filter>{body}</Filter>"))
    }

    fn cmp(op: &str, property: &str, literal: &str) -> String {
        format!("<{op}><PropertyName>{property}</PropertyName><Literal>{literal}</Literal></{op}>")
    }

    fn columns(defs: &[(&str, ColumnType)]) -> Vec<ColumnDefinition> {
        defs.iter()
            .map(|(name, ty)| ColumnDefinition::new(*name, *ty))
            .collect()
    }

    #[test]
    fn test_new_parses_filter() {
        let e = entry(&cmp("PropertyIsEqualTo", "name", "x"));
        assert!(e.enabled);
        assert_eq!(e.filter_tree().unwrap().local_name(), "Filter");
        assert_eq!(e.property_names(), vec!["name"]);
    }

    #[test]
    fn test_invalid_xml_leaves_no_tree() {
        let mut e = entry(&cmp("PropertyIsEqualTo", "name", "x"));
        e.set_filter("<Filter><And>");
        assert!(e.filter_tree().is_none());
        assert!(e.property_names().is_empty());
        assert!(!e.matches(&columns(&[("name", ColumnType::String)])));
    }

    #[test]
    fn test_empty_filter_has_no_tree() {
        let e = FilterEntry::new("e", "t", "   ");
        assert!(e.filter_tree().is_none());
    }

    #[test]
    fn test_matches_requires_every_property() {
        let e = entry(&format!(
            "<And>{}{}</And>",
            cmp("PropertyIsEqualTo", "a", "1"),
            cmp("PropertyIsEqualTo", "b", "2")
        ));
        assert!(e.matches(&columns(&[("a", ColumnType::String), ("b", ColumnType::String)])));
        assert!(!e.matches(&columns(&[("a", ColumnType::String)])));
    }

    #[test]
    fn test_geometry_column_rejected() {
        let e = entry(&cmp("PropertyIsEqualTo", "geom", "x"));
        assert!(!e.matches(&columns(&[("geom", ColumnType::Geometry)])));
    }

    #[test]
    fn test_geometry_under_unregistered_element_rejected() {
        let e = entry(&format!(
            "<And>{}<BBOX><PropertyName>geom</PropertyName></BBOX></And>",
            cmp("PropertyIsEqualTo", "name", "x")
        ));
        let cols = columns(&[("name", ColumnType::String), ("geom", ColumnType::Geometry)]);
        assert!(!e.matches(&cols));

        let e = entry("<Intersects><PropertyName>geom</PropertyName></Intersects>");
        assert!(!e.matches(&columns(&[("geom", ColumnType::Geometry)])));
    }

    #[test]
    fn test_blank_property_condition_is_skipped() {
        let e = entry(&format!(
            "<And>{}{}</And>",
            cmp("PropertyIsEqualTo", "name", "x"),
            cmp("PropertyIsEqualTo", "  ", "y")
        ));
        assert!(e.matches(&columns(&[("name", ColumnType::String)])));
    }

    #[test]
    fn test_numeric_operator_needs_numeric_column() {
        let e = entry(&cmp("PropertyIsGreaterThan", "pop", "100"));
        assert!(e.matches(&columns(&[("pop", ColumnType::Decimal)])));
        assert!(!e.matches(&columns(&[("pop", ColumnType::String)])));
    }

    #[test]
    fn test_numeric_column_needs_numeric_literal() {
        let cols = columns(&[("pop", ColumnType::Decimal)]);
        assert!(!entry(&cmp("PropertyIsGreaterThan", "pop", "abc")).matches(&cols));
        assert!(entry(&cmp("PropertyIsGreaterThan", "pop", "100")).matches(&cols));
        assert!(!entry(&cmp("PropertyIsEqualTo", "pop", "many")).matches(&cols));
    }

    #[test]
    fn test_like_and_null_skip_literal_check() {
        let cols = columns(&[("code", ColumnType::Integer)]);
        assert!(entry(&cmp("PropertyIsLike", "code", "1*")).matches(&cols));
        assert!(entry("<PropertyIsNull><PropertyName>code</PropertyName></PropertyIsNull>")
            .matches(&cols));
    }

    #[test]
    fn test_serde_round_trip_reparses() {
        let e = entry(&cmp("PropertyIsEqualTo", "name", "x")).with_layer_type("vector");
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("tree"));

        let back: FilterEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.layer_type.as_deref(), Some("vector"));
        assert_eq!(back.property_names(), vec!["name"]);
    }

    #[test]
    fn test_deserialized_entry_enabled_by_default() {
        let e: FilterEntry = serde_json::from_str(r#"{"id": "a", "filter": ""}"#).unwrap();
        assert!(e.enabled);
        assert_eq!(e.enabled, FilterEntry::new("a", "", "").enabled);

        let e: FilterEntry = serde_json::from_str(r#"{"id": "a", "enabled": false}"#).unwrap();
        assert!(!e.enabled);
    }
}
