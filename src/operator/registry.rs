//! Operator registry with builder-style registration.

use crate::error::{FilterError, Result};
use crate::operator::types::{Operand, Operator, OperatorKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only set of named operators shared by compiled filters.
///
/// Cloning is cheap: the operator table sits behind an `Arc`.
///
/// # Example
/// ```rust
/// use ogc_filter::operator::{OperatorKind, OperatorRegistry};
///
/// let registry = OperatorRegistry::builder()
///     .register_fn("PropertyStartsWith", "starts with", OperatorKind::Text, |value, operand| {
///         match (value, operand.literal()) {
///             (Some(v), Some(prefix)) => v.starts_with(prefix),
///             _ => false,
///         }
///     })
///     .build();
///
/// assert!(registry.contains("PropertyIsEqualTo"));
/// assert!(registry.contains("PropertyStartsWith"));
/// ```
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: Arc<HashMap<String, Operator>>,
}

impl OperatorRegistry {
    /// Builder pre-populated with the default operators.
    pub fn builder() -> OperatorRegistryBuilder {
        OperatorRegistryBuilder::new()
    }

    /// A registry with no operators; every condition fails to compile.
    pub fn empty() -> Self {
        OperatorRegistryBuilder::empty().build()
    }

    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    /// Like [`get`](Self::get) but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<&Operator> {
        self.get(name)
            .ok_or_else(|| FilterError::UnknownOperator(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Registered operator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`OperatorRegistry`].
pub struct OperatorRegistryBuilder {
    operators: HashMap<String, Operator>,
}

impl OperatorRegistryBuilder {
    /// Create a builder holding the default operators.
    pub fn new() -> Self {
        let mut operators = HashMap::new();
        crate::operator::defaults::register_defaults(&mut operators);
        Self { operators }
    }

    /// Create a builder with no operators registered.
    pub fn empty() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    /// Register an operator, replacing any existing one with the same name.
    pub fn register(mut self, operator: Operator) -> Self {
        self.operators.insert(operator.name().to_string(), operator);
        self
    }

    /// Register an operator from a closure.
    pub fn register_fn<F>(
        self,
        name: &str,
        description: &str,
        kind: OperatorKind,
        func: F,
    ) -> Self
    where
        F: Fn(Option<&str>, &Operand) -> bool + Send + Sync + 'static,
    {
        self.register(Operator::new(
            name.to_string(),
            description.to_string(),
            kind,
            Arc::new(func),
        ))
    }

    /// Remove an operator so conditions using it no longer compile.
    pub fn unregister(mut self, name: &str) -> Self {
        self.operators.remove(name);
        self
    }

    pub fn build(self) -> OperatorRegistry {
        OperatorRegistry {
            operators: Arc::new(self.operators),
        }
    }
}

impl Default for OperatorRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
