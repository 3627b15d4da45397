//! Filter compiler.
//!
//! Turns a [`FilterNode`] tree into a [`CompiledFilter`]: a reusable,
//! thread-safe predicate over records.
//!
//! The compiler is organized into several sub-modules:
//! - [`variables`] - collects referenced properties into binding slots
//! - [`nodes`] - compiles combinators and conditions into an expression tree
//!
//! Compilation never fails. Sub-trees that cannot be understood are dropped
//! by their parent combinator, and a filter with no property references or
//! no usable structure compiles to a predicate that rejects every record.
//!
//! # Examples
//!
//! ```rust
//! use ogc_filter::{FilterCompiler, FilterNode};
//! use serde_json::json;
//!
//! let tree = FilterNode::new("And")
//!     .with_child(FilterNode::comparison("PropertyIsEqualTo", "country", "US"))
//!     .with_child(FilterNode::comparison("PropertyIsGreaterThan", "pop", "100"));
//!
//! let filter = FilterCompiler::new().compile_tree(&tree);
//!
//! assert!(filter.matches(&json!({"country": "US", "pop": 150})));
//! assert!(!filter.matches(&json!({"country": "US", "pop": 50})));
//! ```

pub mod nodes;
pub mod variables;

pub use nodes::{CompiledExpr, Combinator, Condition, NodeCompiler};
pub use variables::{extract_variables, Variable, VariableMap};

use crate::config::{CompilerConfig, ParallelConfig};
use crate::entry::FilterEntry;
use crate::operator::{global_pattern_cache, OperatorRegistry, PatternCache};
use crate::record::{default_value_getter, ValueGetterFn};
use crate::tree::FilterNode;
use rayon::prelude::*;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A boxed predicate, for APIs that want a plain closure.
pub type FilterPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Compiles filter trees against an injected operator registry.
///
/// # Examples
///
/// ```rust
/// use ogc_filter::operator::{OperatorKind, OperatorRegistry};
/// use ogc_filter::{CompilerConfig, FilterCompiler};
///
/// let registry = OperatorRegistry::builder()
///     .register_fn("PropertyIsPositive", "is positive", OperatorKind::Null, |value, _| {
///         value.and_then(|v| v.parse::<f64>().ok()).is_some_and(|n| n > 0.0)
///     })
///     .build();
///
/// let compiler = FilterCompiler::with_registry(registry)
///     .with_config(CompilerConfig { match_case_default: true, ..Default::default() });
/// assert!(compiler.registry().contains("PropertyIsPositive"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    registry: OperatorRegistry,
    config: CompilerConfig,
    patterns: Option<Arc<PatternCache>>,
}

impl FilterCompiler {
    /// Compiler with the default operators and configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: OperatorRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a private LIKE pattern cache instead of the process-wide one.
    pub fn with_pattern_cache(mut self, patterns: Arc<PatternCache>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn pattern_cache(&self) -> &PatternCache {
        match self.patterns.as_deref() {
            Some(patterns) => patterns,
            None => global_pattern_cache(),
        }
    }

    /// Compile a tree into a filter over JSON records.
    pub fn compile_tree(&self, root: &FilterNode) -> CompiledFilter<Value> {
        self.compile_tree_with(root, default_value_getter())
    }

    /// Compile a tree into a filter that reads records through `getter`.
    pub fn compile_tree_with<R>(
        &self,
        root: &FilterNode,
        getter: ValueGetterFn<R>,
    ) -> CompiledFilter<R> {
        let variables = extract_variables(root, &self.config.property_element);
        if variables.is_empty() {
            debug!(root = root.tag(), "filter references no properties, rejecting all records");
            return CompiledFilter::deny_all(getter).with_parallel(self.config.parallel);
        }

        let compiler = NodeCompiler::new(
            &self.registry,
            &variables,
            &self.config,
            self.pattern_cache(),
        );
        let Some(expr) = compiler.compile(root) else {
            debug!(root = root.tag(), "filter has no usable conditions, rejecting all records");
            return CompiledFilter {
                variables: Arc::new(variables),
                expr: None,
                getter,
                parallel: self.config.parallel,
            };
        };

        debug!(
            variables = variables.len(),
            conditions = expr.condition_count(),
            "compiled filter"
        );

        CompiledFilter {
            variables: Arc::new(variables),
            expr: Some(Arc::new(expr)),
            getter,
            parallel: self.config.parallel,
        }
    }

    /// Compile a filter entry into a filter over JSON records.
    pub fn compile_entry(&self, entry: &FilterEntry) -> CompiledFilter<Value> {
        self.compile_entry_with(entry, default_value_getter())
    }

    /// Compile a filter entry; entries without a parsed filter reject everything.
    pub fn compile_entry_with<R>(
        &self,
        entry: &FilterEntry,
        getter: ValueGetterFn<R>,
    ) -> CompiledFilter<R> {
        match entry.filter_tree() {
            Some(root) => self.compile_tree_with(root, getter),
            None => {
                debug!(entry = entry.id(), "filter entry has no filter tree");
                CompiledFilter::deny_all(getter).with_parallel(self.config.parallel)
            }
        }
    }
}

/// Compile a tree with the default compiler.
pub fn compile_tree(root: &FilterNode) -> CompiledFilter<Value> {
    FilterCompiler::new().compile_tree(root)
}

/// Compile a filter entry with the default compiler.
pub fn compile_entry(entry: &FilterEntry) -> CompiledFilter<Value> {
    FilterCompiler::new().compile_entry(entry)
}

/// A compiled, reusable filter predicate.
///
/// Cloning is cheap and the filter is safe to share between threads. Each
/// call to [`matches`](Self::matches) reads every referenced property once
/// through the value getter, then evaluates the compiled expression.
pub struct CompiledFilter<R> {
    variables: Arc<VariableMap>,
    expr: Option<Arc<CompiledExpr>>,
    getter: ValueGetterFn<R>,
    parallel: ParallelConfig,
}

impl<R> CompiledFilter<R> {
    /// A filter that rejects every record.
    pub fn deny_all(getter: ValueGetterFn<R>) -> Self {
        Self {
            variables: Arc::new(VariableMap::new()),
            expr: None,
            getter,
            parallel: ParallelConfig::default(),
        }
    }

    /// Override the batch size threshold for [`par_filter_records`](Self::par_filter_records).
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn parallel(&self) -> ParallelConfig {
        self.parallel
    }

    /// Whether the filter compiled to a usable expression.
    ///
    /// An invalid filter still works as a predicate; it just never matches.
    pub fn is_valid(&self) -> bool {
        self.expr.is_some()
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn expression(&self) -> Option<&CompiledExpr> {
        self.expr.as_deref()
    }

    /// Read every referenced property off `record`, in slot order.
    pub fn bind(&self, record: &R) -> Vec<Option<String>> {
        self.variables
            .names()
            .map(|name| (self.getter)(record, name))
            .collect()
    }

    pub fn matches(&self, record: &R) -> bool {
        match &self.expr {
            Some(expr) => expr.evaluate(&self.bind(record)),
            None => false,
        }
    }

    pub fn filter_records<'r>(&self, records: &'r [R]) -> Vec<&'r R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn count_matches(&self, records: &[R]) -> usize {
        records.iter().filter(|r| self.matches(r)).count()
    }

    /// Convert into a plain shared closure.
    pub fn into_predicate(self) -> FilterPredicate<R>
    where
        R: 'static,
    {
        Arc::new(move |record: &R| self.matches(record))
    }
}

impl<R: Sync> CompiledFilter<R> {
    /// Filter a large batch on the rayon thread pool.
    ///
    /// Batches below the configured threshold are filtered on the calling
    /// thread. Output order matches input order.
    pub fn par_filter_records<'r>(&self, records: &'r [R]) -> Vec<&'r R> {
        if records.len() < self.parallel.min_batch_size_for_parallelism {
            return self.filter_records(records);
        }

        records.par_iter().filter(|r| self.matches(r)).collect()
    }
}

impl<R> Clone for CompiledFilter<R> {
    fn clone(&self) -> Self {
        Self {
            variables: Arc::clone(&self.variables),
            expr: self.expr.clone(),
            getter: Arc::clone(&self.getter),
            parallel: self.parallel,
        }
    }
}

impl<R> fmt::Debug for CompiledFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("variables", &self.variables)
            .field("expr", &self.expr)
            .finish_non_exhaustive()
    }
}

impl<R> fmt::Display for CompiledFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            Some(expr) => write!(f, "{expr}"),
            None => f.write_str("<no match>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::value_getter;
    use serde_json::json;
    use std::collections::HashMap;

    fn eq(property: &str, literal: &str) -> FilterNode {
        FilterNode::comparison("PropertyIsEqualTo", property, literal)
    }

    #[test]
    fn test_empty_tree_denies() {
        let filter = compile_tree(&FilterNode::new("And"));
        assert!(!filter.is_valid());
        assert!(filter.variables().is_empty());
        assert!(!filter.matches(&json!({})));
        assert_eq!(filter.to_string(), "<no match>");
    }

    #[test]
    fn test_deny_all_keeps_configured_parallelism() {
        let parallel = ParallelConfig {
            min_batch_size_for_parallelism: 7,
        };
        let compiler = FilterCompiler::new().with_config(CompilerConfig {
            parallel,
            ..CompilerConfig::default()
        });

        assert_eq!(compiler.compile_tree(&FilterNode::new("And")).parallel(), parallel);
        let broken = FilterEntry::new("broken", "Broken", "<Filter>");
        assert_eq!(compiler.compile_entry(&broken).parallel(), parallel);
        assert_eq!(compiler.compile_tree(&eq("a", "1")).parallel(), parallel);
    }

    #[test]
    fn test_unusable_structure_denies() {
        let tree = FilterNode::new("Bogus").with_child(FilterNode::property_name("a"));
        let filter = compile_tree(&tree);
        assert!(!filter.is_valid());
        assert_eq!(filter.variables().len(), 1);
        assert!(!filter.matches(&json!({"a": "1"})));
    }

    #[test]
    fn test_bind_reads_each_property_once() {
        let tree = FilterNode::new("Or")
            .with_child(eq("a", "1"))
            .with_child(eq("a", "2"))
            .with_child(eq("b", "3"));
        let filter = compile_tree(&tree);

        let bound = filter.bind(&json!({"a": 2, "b": "x"}));
        assert_eq!(bound, vec![Some("2".to_string()), Some("x".to_string())]);
        assert!(filter.matches(&json!({"a": 2})));
    }

    #[test]
    fn test_custom_getter() {
        struct Feature {
            props: HashMap<&'static str, &'static str>,
        }

        let getter = value_getter(|f: &Feature, name: &str| {
            f.props.get(name).map(|v| v.to_string())
        });
        let filter = FilterCompiler::new().compile_tree_with(&eq("kind", "river"), getter);

        let river = Feature {
            props: HashMap::from([("kind", "River")]),
        };
        let road = Feature {
            props: HashMap::from([("kind", "road")]),
        };
        assert!(filter.matches(&river));
        assert!(!filter.matches(&road));
    }

    #[test]
    fn test_filter_and_count_records() {
        let filter = compile_tree(&eq("a", "1"));
        let records = vec![json!({"a": 1}), json!({"a": 2}), json!({"a": "1"})];

        assert_eq!(filter.filter_records(&records).len(), 2);
        assert_eq!(filter.count_matches(&records), 2);
    }

    #[test]
    fn test_par_filter_preserves_order() {
        let config = CompilerConfig {
            parallel: ParallelConfig {
                min_batch_size_for_parallelism: 1,
            },
            ..CompilerConfig::default()
        };
        let tree = FilterNode::comparison("PropertyIsLessThan", "n", "500");
        let filter = FilterCompiler::new().with_config(config).compile_tree(&tree);

        let records: Vec<Value> = (0..1000).map(|n| json!({ "n": n })).collect();
        let matched = filter.par_filter_records(&records);
        assert_eq!(matched.len(), 500);
        assert_eq!(matched[0]["n"], 0);
        assert_eq!(matched[499]["n"], 499);
    }

    #[test]
    fn test_into_predicate() {
        let predicate = compile_tree(&eq("a", "x")).into_predicate();
        let records = vec![json!({"a": "x"}), json!({"a": "y"})];
        assert!(records.iter().any(|r| predicate(r)));
        assert!(!records.iter().all(|r| predicate(r)));
    }

    #[test]
    fn test_private_pattern_cache() {
        let cache = Arc::new(PatternCache::new());
        let compiler = FilterCompiler::new().with_pattern_cache(Arc::clone(&cache));
        let tree = FilterNode::comparison("PropertyIsLike", "name", "a*");

        let filter = compiler.compile_tree(&tree);
        assert!(filter.matches(&json!({"name": "abc"})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_compiled_filter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledFilter<Value>>();
        assert_send_sync::<FilterCompiler>();
    }
}
