//! Tree-to-expression compilation.
//!
//! Each filter node is classified as a combinator (`And`, `Or`, `Not`), a
//! condition (a registered operator), or neither. Nodes that cannot be
//! compiled produce no expression and are dropped by their parent instead
//! of failing the whole filter.

use crate::compiler::variables::VariableMap;
use crate::config::{CompilerConfig, LikeDefaults};
use crate::error::{FilterError, Result};
use crate::operator::{Operand, Operator, OperatorKind, OperatorRegistry, PatternCache};
use crate::tree::FilterNode;
use std::fmt;
use tracing::debug;

/// Logical combinator element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
    /// Matches when none of its children match.
    Not,
}

impl Combinator {
    /// Classify a local element name, ignoring case.
    ///
    /// The OGC `Filter` wrapper counts as `And` when
    /// [`CompilerConfig::filter_wrapper_as_and`] is set.
    pub fn classify(local_name: &str, config: &CompilerConfig) -> Option<Self> {
        if local_name.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if local_name.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else if local_name.eq_ignore_ascii_case("not") {
            Some(Self::Not)
        } else if config.filter_wrapper_as_and && local_name.eq_ignore_ascii_case("filter") {
            Some(Self::And)
        } else {
            None
        }
    }
}

/// A compiled leaf condition.
#[derive(Debug, Clone)]
pub struct Condition {
    pub property: String,
    pub slot: usize,
    pub operator: Operator,
    pub operand: Operand,
}

/// Compiled boolean expression over a slot table of bound property values.
#[derive(Debug, Clone)]
pub enum CompiledExpr {
    /// Every child matches.
    All(Vec<CompiledExpr>),
    /// At least one child matches.
    Any(Vec<CompiledExpr>),
    /// No child matches.
    NoneOf(Vec<CompiledExpr>),
    Condition(Condition),
}

impl CompiledExpr {
    /// Evaluate against values bound in slot order.
    pub fn evaluate(&self, slots: &[Option<String>]) -> bool {
        match self {
            CompiledExpr::All(children) => children.iter().all(|c| c.evaluate(slots)),
            CompiledExpr::Any(children) => children.iter().any(|c| c.evaluate(slots)),
            CompiledExpr::NoneOf(children) => !children.iter().any(|c| c.evaluate(slots)),
            CompiledExpr::Condition(condition) => {
                let value = slots.get(condition.slot).and_then(|v| v.as_deref());
                condition.operator.matches(value, &condition.operand)
            }
        }
    }

    /// Number of leaf conditions.
    pub fn condition_count(&self) -> usize {
        match self {
            CompiledExpr::All(children)
            | CompiledExpr::Any(children)
            | CompiledExpr::NoneOf(children) => children.iter().map(Self::condition_count).sum(),
            CompiledExpr::Condition(_) => 1,
        }
    }
}

impl fmt::Display for CompiledExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, separator, children) = match self {
            CompiledExpr::All(children) => ("", " && ", children),
            CompiledExpr::Any(children) => ("", " || ", children),
            CompiledExpr::NoneOf(children) => ("!", " || ", children),
            CompiledExpr::Condition(c) => {
                write!(f, "{} {}", c.property, c.operator.describe())?;
                for literal in &c.operand.literals {
                    write!(f, " {literal:?}")?;
                }
                return Ok(());
            }
        };

        write!(f, "{prefix}(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

/// Compiles filter nodes against a fixed variable map and operator registry.
pub struct NodeCompiler<'a> {
    registry: &'a OperatorRegistry,
    variables: &'a VariableMap,
    config: &'a CompilerConfig,
    patterns: &'a PatternCache,
}

impl<'a> NodeCompiler<'a> {
    pub fn new(
        registry: &'a OperatorRegistry,
        variables: &'a VariableMap,
        config: &'a CompilerConfig,
        patterns: &'a PatternCache,
    ) -> Self {
        Self {
            registry,
            variables,
            config,
            patterns,
        }
    }

    /// Compile a node, returning `None` for the empty expression.
    pub fn compile(&self, node: &FilterNode) -> Option<CompiledExpr> {
        let name = node.local_name();

        if let Some(combinator) = Combinator::classify(name, self.config) {
            return self.compile_combinator(combinator, node);
        }

        if let Some(operator) = self.registry.get(name) {
            return match self.compile_condition(operator, node) {
                Ok(condition) => Some(CompiledExpr::Condition(condition)),
                Err(reason) => {
                    debug!(element = node.tag(), %reason, "dropping filter condition");
                    None
                }
            };
        }

        debug!(element = node.tag(), "dropping unrecognized filter element");
        None
    }

    fn compile_combinator(&self, combinator: Combinator, node: &FilterNode) -> Option<CompiledExpr> {
        let mut children: Vec<CompiledExpr> = node
            .children()
            .iter()
            .filter_map(|child| self.compile(child))
            .collect();

        if children.is_empty() {
            debug!(element = node.tag(), "combinator has no usable children");
            return None;
        }

        Some(match combinator {
            Combinator::And if children.len() == 1 => children.remove(0),
            Combinator::Or if children.len() == 1 => children.remove(0),
            Combinator::And => CompiledExpr::All(children),
            Combinator::Or => CompiledExpr::Any(children),
            Combinator::Not => CompiledExpr::NoneOf(children),
        })
    }

    fn compile_condition(&self, operator: &Operator, node: &FilterNode) -> Result<Condition> {
        let property = node
            .descendants()
            .skip(1)
            .find(|n| n.local_name() == self.config.property_element)
            .map(|n| n.text().trim())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                FilterError::InvalidCondition("condition has no property name".to_string())
            })?;

        let slot = self.variables.slot(property).ok_or_else(|| {
            FilterError::InvalidCondition(format!(
                "property {property:?} has no variable binding"
            ))
        })?;

        let operand = self.prepare_operand(operator, node)?;

        Ok(Condition {
            property: property.to_string(),
            slot,
            operator: operator.clone(),
            operand,
        })
    }

    fn prepare_operand(&self, operator: &Operator, node: &FilterNode) -> Result<Operand> {
        let kind = operator.kind();
        let literals = match kind {
            OperatorKind::Range => range_literals(node).unwrap_or_else(|| literals(node)),
            _ => literals(node),
        };

        if literals.len() < kind.required_literals() {
            return Err(FilterError::InvalidCondition(format!(
                "{} needs {} literal(s), found {}",
                operator.name(),
                kind.required_literals(),
                literals.len()
            )));
        }

        let match_case = node
            .attribute("matchCase")
            .and_then(parse_bool)
            .unwrap_or(self.config.match_case_default);

        let mut operand = Operand::new(literals).with_match_case(match_case);

        if kind == OperatorKind::Text {
            let chars = self.like_chars(node);
            let pattern = operand.literal().unwrap_or_default();
            let regex = self.patterns.like_regex(pattern, chars, match_case)?;
            operand = operand.with_pattern(regex);
        }

        Ok(operand)
    }

    fn like_chars(&self, node: &FilterNode) -> LikeDefaults {
        let defaults = self.config.like;
        let pick = |names: &[&str], fallback: char| {
            names
                .iter()
                .find_map(|name| node.attribute(name))
                .and_then(|value| value.chars().next())
                .unwrap_or(fallback)
        };

        LikeDefaults {
            wild_card: pick(&["wildCard"], defaults.wild_card),
            single_char: pick(&["singleChar"], defaults.single_char),
            escape_char: pick(&["escapeChar", "escape"], defaults.escape_char),
        }
    }
}

/// Trimmed `Literal` texts below `node`, in document order.
fn literals(node: &FilterNode) -> Vec<String> {
    node.descendants()
        .skip(1)
        .filter(|n| n.local_name() == "Literal")
        .map(|n| n.text().trim().to_string())
        .collect()
}

/// `[lower, upper]` from `LowerBoundary`/`UpperBoundary`, if both are present.
fn range_literals(node: &FilterNode) -> Option<Vec<String>> {
    let bound = |name: &str| {
        let boundary = node.child(name)?;
        literals(boundary).into_iter().next()
    };
    Some(vec![bound("LowerBoundary")?, bound("UpperBoundary")?])
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") || v == "1" => Some(true),
        v if v.eq_ignore_ascii_case("false") || v == "0" => Some(false),
        _ => None,
    }
}
