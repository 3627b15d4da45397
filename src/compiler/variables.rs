//! Property reference extraction.
//!
//! Every distinct property a filter mentions gets one binding slot, so a
//! compiled filter reads each field at most once per record no matter how
//! many conditions reference it.

use crate::tree::FilterNode;
use std::collections::HashMap;
use tracing::trace;

/// A binding slot for one referenced property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Property name as written in the filter (trimmed, case-sensitive).
    pub name: String,
    /// Generated identifier, `v0`, `v1`, ... in order of first reference.
    pub ident: String,
    /// Position in the slot table handed to compiled expressions.
    pub index: usize,
}

/// Deduplicated mapping of property names to binding slots.
///
/// Iteration order follows first occurrence in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap {
    variables: Vec<Variable>,
    lookup: HashMap<String, usize>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a property name, returning its slot.
    ///
    /// Names are trimmed first. Blank names are not bound and return `None`;
    /// a name seen before returns its existing slot.
    pub fn bind(&mut self, name: &str) -> Option<usize> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if let Some(&index) = self.lookup.get(name) {
            return Some(index);
        }

        let index = self.variables.len();
        let ident = format!("v{index}");
        trace!(property = name, ident = %ident, "bound filter property");

        self.lookup.insert(name.to_string(), index);
        self.variables.push(Variable {
            name: name.to_string(),
            ident,
            index,
        });
        Some(index)
    }

    /// Slot of a property name (trimmed before lookup).
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.lookup.get(name.trim()).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.slot(name).map(|index| &self.variables[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// Property names in slot order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }
}

/// Collect every property referenced by `root`.
///
/// Visits the tree depth-first in document order and binds the text of
/// each element whose local name is `property_element`.
pub fn extract_variables(root: &FilterNode, property_element: &str) -> VariableMap {
    let mut variables = VariableMap::new();

    for node in root.descendants() {
        if node.local_name() == property_element {
            variables.bind(node.text());
        }
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPERTY: &str = "PropertyName";

    fn eq(property: &str, literal: &str) -> FilterNode {
        FilterNode::comparison("PropertyIsEqualTo", property, literal)
    }

    #[test]
    fn test_empty_tree() {
        let variables = extract_variables(&FilterNode::new("And"), PROPERTY);
        assert!(variables.is_empty());
    }

    #[test]
    fn test_first_occurrence_order() {
        let tree = FilterNode::new("Or")
            .with_child(FilterNode::new("And").with_child(eq("b", "1")).with_child(eq("a", "2")))
            .with_child(eq("c", "3"));

        let variables = extract_variables(&tree, PROPERTY);
        let names: Vec<&str> = variables.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(variables.get("b").unwrap().ident, "v0");
        assert_eq!(variables.get("a").unwrap().ident, "v1");
        assert_eq!(variables.get("c").unwrap().ident, "v2");
    }

    #[test]
    fn test_duplicates_share_one_slot() {
        let tree = FilterNode::new("And")
            .with_child(eq("x", "1"))
            .with_child(eq("x", "2"))
            .with_child(FilterNode::new("Not").with_child(eq("x", "3")));

        let variables = extract_variables(&tree, PROPERTY);
        assert_eq!(variables.len(), 1);
        assert_eq!(variables.slot("x"), Some(0));
    }

    #[test]
    fn test_blank_names_skipped() {
        let tree = FilterNode::new("And")
            .with_child(eq("   ", "1"))
            .with_child(eq("", "2"))
            .with_child(eq(" y ", "3"));

        let variables = extract_variables(&tree, PROPERTY);
        assert_eq!(variables.len(), 1);
        assert_eq!(variables.get("y").unwrap().ident, "v0");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let tree = FilterNode::new("And")
            .with_child(eq("Name", "1"))
            .with_child(eq("name", "2"));

        assert_eq!(extract_variables(&tree, PROPERTY).len(), 2);
    }

    #[test]
    fn test_namespaced_property_elements() {
        let tree = FilterNode::new("ogc:PropertyIsNull")
            .with_child(FilterNode::new("ogc:PropertyName").with_text("z"));

        assert!(extract_variables(&tree, PROPERTY).contains("z"));
    }

    #[test]
    fn test_custom_property_element() {
        let tree = FilterNode::new("PropertyIsNull")
            .with_child(FilterNode::new("ValueReference").with_text("z"));

        assert!(extract_variables(&tree, PROPERTY).is_empty());
        assert!(extract_variables(&tree, "ValueReference").contains("z"));
    }
}
