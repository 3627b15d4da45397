//! # OGC Filter Compiler
//!
//! Compiles [OGC Filter Encoding](https://www.ogc.org/standard/filter/) trees
//! into reusable, thread-safe predicates over records.
//!
//! A filter tree is made of combinators (`And`, `Or`, `Not`) and comparison
//! conditions (`PropertyIsEqualTo`, `PropertyIsLike`, ...). Compilation
//! collects the referenced properties into binding slots, resolves each
//! condition against an injected [`OperatorRegistry`](operator::OperatorRegistry)
//! and produces a [`CompiledFilter`] that reads every property once per record.
//!
//! Compilation never fails. Unknown elements are skipped, and a filter with
//! nothing usable compiles to a predicate that rejects every record.
//!
//! ## Quick Start
//!
//! ```rust
//! use ogc_filter::{compile_tree, FilterNode};
//! use serde_json::json;
//!
//! let xml = r#"
//! <ogc:Filter xmlns:ogc="http://www.opengis.net/ogc">
//!   <ogc:Or>
//!     <ogc:And>
//!       <ogc:PropertyIsEqualTo>
//!         <ogc:PropertyName>country</ogc:PropertyName>
//!         <ogc:Literal>US</ogc:Literal>
//!       </ogc:PropertyIsEqualTo>
//!       <ogc:PropertyIsGreaterThan>
//!         <ogc:PropertyName>pop</ogc:PropertyName>
//!         <ogc:Literal>100</ogc:Literal>
//!       </ogc:PropertyIsGreaterThan>
//!     </ogc:And>
//!     <ogc:PropertyIsEqualTo>
//!       <ogc:PropertyName>country</ogc:PropertyName>
//!       <ogc:Literal>CA</ogc:Literal>
//!     </ogc:PropertyIsEqualTo>
//!   </ogc:Or>
//! </ogc:Filter>"#;
//!
//! let tree = FilterNode::from_xml(xml)?;
//! let filter = compile_tree(&tree);
//!
//! assert!(filter.matches(&json!({"country": "US", "pop": 150})));
//! assert!(!filter.matches(&json!({"country": "US", "pop": 50})));
//! assert!(filter.matches(&json!({"country": "CA", "pop": 1})));
//! # Ok::<(), ogc_filter::FilterError>(())
//! ```
//!
//! ## Custom Records
//!
//! Any record type works with a value getter:
//!
//! ```rust
//! use ogc_filter::record::value_getter;
//! use ogc_filter::{FilterCompiler, FilterNode};
//!
//! struct Station { id: u32, kind: &'static str }
//!
//! let getter = value_getter(|s: &Station, name: &str| match name {
//!     "id" => Some(s.id.to_string()),
//!     "kind" => Some(s.kind.to_string()),
//!     _ => None,
//! });
//!
//! let tree = FilterNode::comparison("PropertyIsEqualTo", "kind", "tide");
//! let filter = FilterCompiler::new().compile_tree_with(&tree, getter);
//!
//! assert!(filter.matches(&Station { id: 7, kind: "Tide" }));
//! ```
//!
//! ## Column Compatibility
//!
//! ```rust
//! use ogc_filter::{ColumnDefinition, ColumnType, FilterEntry};
//!
//! let entry = FilterEntry::new(
//!     "dense",
//!     "Dense areas",
//!     "<Filter><PropertyIsGreaterThan><PropertyName>pop</PropertyName>\
//!      <Literal>abc</Literal></PropertyIsGreaterThan></Filter>",
//! );
//!
//! assert!(!entry.matches(&[ColumnDefinition::new("pop", ColumnType::Decimal)]));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use ogc_filter::{CompilerConfig, FilterCompiler};
//!
//! let config = CompilerConfig::from_yaml_str("match_case_default: true\n")?;
//! let compiler = FilterCompiler::new().with_config(config);
//! assert!(compiler.config().match_case_default);
//! # Ok::<(), ogc_filter::FilterError>(())
//! ```

pub mod column;
pub mod compiler;
pub mod config;
pub mod entry;
pub mod error;
pub mod operator;
pub mod record;
pub mod tree;

pub use column::{ColumnDefinition, ColumnType};
pub use compiler::{
    compile_entry, compile_tree, CompiledExpr, CompiledFilter, FilterCompiler, FilterPredicate,
    VariableMap,
};
pub use config::CompilerConfig;
pub use entry::FilterEntry;
pub use error::{FilterError, Result};
pub use operator::{Operator, OperatorKind, OperatorRegistry};
pub use record::{Record, ValueGetterFn};
pub use tree::FilterNode;
