//! Default operator implementations.
//!
//! | Element | Kind |
//! |---------|------|
//! | `PropertyIsEqualTo` / `PropertyIsNotEqualTo` | Equality |
//! | `PropertyIsLessThan` / `PropertyIsLessThanOrEqualTo` | Numeric |
//! | `PropertyIsGreaterThan` / `PropertyIsGreaterThanOrEqualTo` | Numeric |
//! | `PropertyIsLike` | Text |
//! | `PropertyIsNull` | Null |
//! | `PropertyIsBetween` | Range |
//! | `PropertyIsIn` | List |

use crate::operator::types::{parse_number, MatchFn, Operator, OperatorKind};
use std::collections::HashMap;
use std::sync::Arc;

pub const EQUAL_TO: &str = "PropertyIsEqualTo";
pub const NOT_EQUAL_TO: &str = "PropertyIsNotEqualTo";
pub const LESS_THAN: &str = "PropertyIsLessThan";
pub const LESS_THAN_OR_EQUAL_TO: &str = "PropertyIsLessThanOrEqualTo";
pub const GREATER_THAN: &str = "PropertyIsGreaterThan";
pub const GREATER_THAN_OR_EQUAL_TO: &str = "PropertyIsGreaterThanOrEqualTo";
pub const LIKE: &str = "PropertyIsLike";
pub const NULL: &str = "PropertyIsNull";
pub const BETWEEN: &str = "PropertyIsBetween";
pub const IN_LIST: &str = "PropertyIsIn";

/// Compare a record value with a literal.
///
/// Two numeric strings compare as numbers (`"100"` equals `"100.0"`);
/// anything else compares as text, ignoring case unless `match_case` is set.
pub fn values_equal(value: &str, literal: &str, match_case: bool) -> bool {
    if let (Some(a), Some(b)) = (parse_number(value), parse_number(literal)) {
        return a == b;
    }

    if match_case {
        value == literal
    } else {
        value.to_lowercase() == literal.to_lowercase()
    }
}

/// Equality against the first literal. A missing value never matches.
pub fn create_equal_to() -> MatchFn {
    Arc::new(|value, operand| match (value, operand.literal()) {
        (Some(value), Some(literal)) => values_equal(value, literal, operand.match_case),
        _ => false,
    })
}

/// Inequality against the first literal. A missing value is unequal.
pub fn create_not_equal_to() -> MatchFn {
    Arc::new(|value, operand| match (value, operand.literal()) {
        (Some(value), Some(literal)) => !values_equal(value, literal, operand.match_case),
        (None, Some(_)) => true,
        _ => false,
    })
}

/// Numeric ordering against the first literal.
///
/// Both sides must parse as numbers, otherwise the condition does not match.
pub fn create_numeric_compare(compare: fn(f64, f64) -> bool) -> MatchFn {
    Arc::new(move |value, operand| {
        let lhs = value.and_then(parse_number);
        let rhs = operand.literal().and_then(parse_number);
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => compare(lhs, rhs),
            _ => false,
        }
    })
}

/// Pattern match using the regex prepared at compile time.
pub fn create_like() -> MatchFn {
    Arc::new(|value, operand| match (value, operand.pattern.as_ref()) {
        (Some(value), Some(pattern)) => pattern.is_match(value),
        _ => false,
    })
}

/// Matches a missing or blank value.
pub fn create_is_null() -> MatchFn {
    Arc::new(|value, _operand| value.map_or(true, |v| v.trim().is_empty()))
}

/// Inclusive numeric range: first literal is the lower bound, second the upper.
pub fn create_between() -> MatchFn {
    Arc::new(|value, operand| {
        let Some(value) = value.and_then(parse_number) else {
            return false;
        };
        let lower = operand.literals.first().and_then(|l| parse_number(l));
        let upper = operand.literals.get(1).and_then(|u| parse_number(u));
        match (lower, upper) {
            (Some(lower), Some(upper)) => value >= lower && value <= upper,
            _ => false,
        }
    })
}

/// Equality against any of the literals.
pub fn create_in_list() -> MatchFn {
    Arc::new(|value, operand| {
        value.is_some_and(|value| {
            operand
                .literals
                .iter()
                .any(|literal| values_equal(value, literal, operand.match_case))
        })
    })
}

/// The default operator set.
pub fn default_operators() -> Vec<Operator> {
    vec![
        Operator::new(EQUAL_TO, "is equal to", OperatorKind::Equality, create_equal_to()),
        Operator::new(
            NOT_EQUAL_TO,
            "is not equal to",
            OperatorKind::Equality,
            create_not_equal_to(),
        ),
        Operator::new(
            LESS_THAN,
            "is less than",
            OperatorKind::Numeric,
            create_numeric_compare(|a, b| a < b),
        ),
        Operator::new(
            LESS_THAN_OR_EQUAL_TO,
            "is less than or equal to",
            OperatorKind::Numeric,
            create_numeric_compare(|a, b| a <= b),
        ),
        Operator::new(
            GREATER_THAN,
            "is greater than",
            OperatorKind::Numeric,
            create_numeric_compare(|a, b| a > b),
        ),
        Operator::new(
            GREATER_THAN_OR_EQUAL_TO,
            "is greater than or equal to",
            OperatorKind::Numeric,
            create_numeric_compare(|a, b| a >= b),
        ),
        Operator::new(LIKE, "is like", OperatorKind::Text, create_like()),
        Operator::new(NULL, "is empty", OperatorKind::Null, create_is_null()),
        Operator::new(BETWEEN, "is between", OperatorKind::Range, create_between()),
        Operator::new(IN_LIST, "is in list", OperatorKind::List, create_in_list()),
    ]
}

/// Register the default operators into a registry map.
pub fn register_defaults(registry: &mut HashMap<String, Operator>) {
    for operator in default_operators() {
        registry.insert(operator.name().to_string(), operator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::types::Operand;

    fn operand(literals: &[&str]) -> Operand {
        Operand::new(literals.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal("100", "100.0", false));
        assert!(values_equal("US", "us", false));
        assert!(!values_equal("US", "us", true));
        assert!(!values_equal("100", "abc", false));
    }

    #[test]
    fn test_equal_to() {
        let eq = create_equal_to();
        assert!(eq(Some("1"), &operand(&["1"])));
        assert!(eq(Some("Canada"), &operand(&["canada"])));
        assert!(!eq(Some("Canada"), &operand(&["canada"]).with_match_case(true)));
        assert!(!eq(None, &operand(&["1"])));
        assert!(!eq(Some("1"), &operand(&[])));
    }

    #[test]
    fn test_not_equal_to() {
        let ne = create_not_equal_to();
        assert!(ne(Some("2"), &operand(&["1"])));
        assert!(!ne(Some("1.0"), &operand(&["1"])));
        assert!(ne(None, &operand(&["1"])));
    }

    #[test]
    fn test_numeric_compare() {
        let gt = create_numeric_compare(|a, b| a > b);
        assert!(gt(Some("150"), &operand(&["100"])));
        assert!(!gt(Some("50"), &operand(&["100"])));
        assert!(!gt(Some("abc"), &operand(&["100"])));
        assert!(!gt(Some("150"), &operand(&["abc"])));
        assert!(!gt(None, &operand(&["100"])));

        let lte = create_numeric_compare(|a, b| a <= b);
        assert!(lte(Some("100"), &operand(&["100"])));
        assert!(lte(Some(" -3 "), &operand(&["0"])));
    }

    #[test]
    fn test_is_null() {
        let is_null = create_is_null();
        assert!(is_null(None, &Operand::default()));
        assert!(is_null(Some(""), &Operand::default()));
        assert!(is_null(Some("  "), &Operand::default()));
        assert!(!is_null(Some("x"), &Operand::default()));
    }

    #[test]
    fn test_between() {
        let between = create_between();
        assert!(between(Some("5"), &operand(&["1", "10"])));
        assert!(between(Some("1"), &operand(&["1", "10"])));
        assert!(between(Some("10"), &operand(&["1", "10"])));
        assert!(!between(Some("11"), &operand(&["1", "10"])));
        assert!(!between(Some("5"), &operand(&["1"])));
        assert!(!between(Some("x"), &operand(&["1", "10"])));
    }

    #[test]
    fn test_in_list() {
        let in_list = create_in_list();
        assert!(in_list(Some("ca"), &operand(&["US", "CA", "MX"])));
        assert!(!in_list(Some("FR"), &operand(&["US", "CA", "MX"])));
        assert!(!in_list(None, &operand(&["US"])));
    }

    #[test]
    fn test_like_without_pattern_never_matches() {
        let like = create_like();
        assert!(!like(Some("abc"), &operand(&["abc"])));
    }

    #[test]
    fn test_register_defaults() {
        let mut registry = HashMap::new();
        register_defaults(&mut registry);
        assert_eq!(registry.len(), 10);
        assert_eq!(registry[GREATER_THAN].kind(), OperatorKind::Numeric);
        assert_eq!(registry[LIKE].describe(), "is like");
    }
}
