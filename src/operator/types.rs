//! Core operator types.

use crate::column::ColumnType;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Match function signature.
///
/// Receives the record's value for the condition's property (`None` when the
/// record has no such field) and the operand prepared at compile time.
///
/// # Example
/// ```rust
/// use ogc_filter::operator::{MatchFn, Operand};
/// use std::sync::Arc;
///
/// let starts_with: MatchFn = Arc::new(|value, operand| {
///     match (value, operand.literal()) {
///         (Some(v), Some(prefix)) => v.starts_with(prefix),
///         _ => false,
///     }
/// });
///
/// let operand = Operand::new(vec!["ab".to_string()]);
/// assert!(starts_with(Some("abc"), &operand));
/// assert!(!starts_with(None, &operand));
/// ```
pub type MatchFn = Arc<dyn Fn(Option<&str>, &Operand) -> bool + Send + Sync>;

/// Broad behaviour class of an operator.
///
/// The kind decides how many literals a condition needs, whether a LIKE
/// pattern is pre-compiled, and which column types the operator can be
/// applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Equality and inequality: any column type, numeric-aware comparison.
    Equality,
    /// Ordering comparisons: numeric columns only.
    Numeric,
    /// Wildcard pattern matching.
    Text,
    /// Presence checks, no literal.
    Null,
    /// Inclusive lower/upper bound: numeric columns only.
    Range,
    /// Membership in a list of literals.
    List,
}

impl OperatorKind {
    /// Minimum number of literals a condition of this kind carries.
    pub fn required_literals(self) -> usize {
        match self {
            Self::Null => 0,
            Self::Range => 2,
            _ => 1,
        }
    }

    /// Whether every literal must be numeric when the column is numeric.
    pub fn checks_numeric_literals(self) -> bool {
        matches!(
            self,
            Self::Equality | Self::Numeric | Self::Range | Self::List
        )
    }
}

/// Compile-time operand of a condition.
#[derive(Debug, Clone, Default)]
pub struct Operand {
    /// Trimmed literal texts in document order.
    pub literals: Vec<String>,
    /// Compare strings case-sensitively.
    pub match_case: bool,
    /// Pre-compiled LIKE pattern, set for [`OperatorKind::Text`] operators.
    pub pattern: Option<Arc<Regex>>,
}

impl Operand {
    pub fn new(literals: Vec<String>) -> Self {
        Self {
            literals,
            ..Self::default()
        }
    }

    pub fn with_match_case(mut self, match_case: bool) -> Self {
        self.match_case = match_case;
        self
    }

    pub fn with_pattern(mut self, pattern: Arc<Regex>) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// The first literal, which is the only one for binary comparisons.
    pub fn literal(&self) -> Option<&str> {
        self.literals.first().map(String::as_str)
    }
}

/// A named comparison operator.
///
/// Operators are registered once in an
/// [`OperatorRegistry`](crate::operator::OperatorRegistry) and shared by
/// every filter compiled against it.
#[derive(Clone)]
pub struct Operator {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    kind: OperatorKind,
    match_fn: MatchFn,
}

impl Operator {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        kind: OperatorKind,
        match_fn: MatchFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            match_fn,
        }
    }

    /// Element local name this operator is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable description for diagnostics.
    pub fn describe(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    #[inline]
    pub fn matches(&self, value: Option<&str>, operand: &Operand) -> bool {
        (self.match_fn)(value, operand)
    }

    /// Whether this operator may be applied to a column of the given type.
    ///
    /// Geometry columns are never supported; ordering and range operators
    /// need numeric columns.
    pub fn supports_column(&self, column_type: ColumnType) -> bool {
        if column_type.is_geometry() {
            return false;
        }

        match self.kind {
            OperatorKind::Numeric | OperatorKind::Range => column_type.is_numeric(),
            _ => true,
        }
    }

    /// Whether `literal` is a valid operand against a column of the given type.
    pub fn accepts_literal(&self, literal: &str, column_type: ColumnType) -> bool {
        if column_type.is_numeric() && self.kind.checks_numeric_literals() {
            return parse_number(literal).is_some();
        }
        true
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Parse a trimmed string as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(result: bool) -> MatchFn {
        Arc::new(move |_, _| result)
    }

    #[test]
    fn test_required_literals() {
        assert_eq!(OperatorKind::Null.required_literals(), 0);
        assert_eq!(OperatorKind::Equality.required_literals(), 1);
        assert_eq!(OperatorKind::Text.required_literals(), 1);
        assert_eq!(OperatorKind::Range.required_literals(), 2);
    }

    #[test]
    fn test_operator_accessors() {
        let op = Operator::new("Custom", "custom test", OperatorKind::Text, always(true));
        assert_eq!(op.name(), "Custom");
        assert_eq!(op.describe(), "custom test");
        assert_eq!(op.kind(), OperatorKind::Text);
        assert!(op.matches(None, &Operand::default()));
        assert!(format!("{op:?}").contains("Custom"));
    }

    #[test]
    fn test_supports_column() {
        let numeric = Operator::new("Gt", "gt", OperatorKind::Numeric, always(true));
        assert!(numeric.supports_column(ColumnType::Decimal));
        assert!(numeric.supports_column(ColumnType::Integer));
        assert!(!numeric.supports_column(ColumnType::String));
        assert!(!numeric.supports_column(ColumnType::Geometry));

        let equality = Operator::new("Eq", "eq", OperatorKind::Equality, always(true));
        assert!(equality.supports_column(ColumnType::String));
        assert!(!equality.supports_column(ColumnType::Geometry));
    }

    #[test]
    fn test_accepts_literal() {
        let numeric = Operator::new("Gt", "gt", OperatorKind::Numeric, always(true));
        assert!(numeric.accepts_literal("100", ColumnType::Decimal));
        assert!(!numeric.accepts_literal("abc", ColumnType::Decimal));

        let like = Operator::new("Like", "like", OperatorKind::Text, always(true));
        assert!(like.accepts_literal("1*", ColumnType::Integer));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.5e2"), Some(-150.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_operator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Operator>();
        assert_send_sync::<Operand>();
    }
}
