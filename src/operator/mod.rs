//! Comparison operators.
//!
//! Operators are the leaves of a compiled filter. Each one is registered by
//! the OGC element name it handles (`PropertyIsEqualTo`, `PropertyIsLike`,
//! ...) and evaluates a record value against the operand prepared when the
//! filter was compiled.
//!
//! ## Core Components
//!
//! - [`Operator`] - named match function plus its [`OperatorKind`]
//! - [`Operand`] - literals, case sensitivity and pre-compiled LIKE regex
//! - [`OperatorRegistry`] - the read-only table injected into the compiler
//! - [`PatternCache`] - shared cache of compiled LIKE patterns

pub mod cache;
pub mod defaults;
pub mod registry;
pub mod types;

pub use cache::{global_pattern_cache, init_global_cache, like_to_regex, CacheConfig, PatternCache};
pub use defaults::{default_operators, register_defaults, values_equal};
pub use registry::{OperatorRegistry, OperatorRegistryBuilder};
pub use types::{parse_number, MatchFn, Operand, Operator, OperatorKind};
