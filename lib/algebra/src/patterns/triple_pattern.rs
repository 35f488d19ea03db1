use crate::algebra::push_unique;
use crate::expr::Expression;
use crate::patterns::{PatternItem, PropertyFunctionPattern};
use crate::Query;
use itertools::Itertools;
use rdf_rewrite_model::{PropertyPathExpression, Variable};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// The discriminant of a [TriplePattern].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriplePatternType {
    Match,
    Filter,
    BindAssignment,
    LetAssignment,
    SubQuery,
    Path,
    PropertyFunction,
}

/// A pattern that matches triples.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchPattern {
    pub subject: PatternItem,
    pub predicate: PatternItem,
    pub object: PatternItem,
}

impl MatchPattern {
    /// Creates a new [MatchPattern].
    pub fn new(
        subject: impl Into<PatternItem>,
        predicate: impl Into<PatternItem>,
        object: impl Into<PatternItem>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    pub fn items(&self) -> [&PatternItem; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Returns the named variables of this pattern.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.items().into_iter().filter_map(PatternItem::variable)
    }

    pub fn has_no_blank_variables(&self) -> bool {
        !self.items().into_iter().any(PatternItem::is_blank_variable)
    }
}

impl Display for MatchPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A pattern that matches a property path between two items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathPattern {
    pub subject: PatternItem,
    pub path: PropertyPathExpression,
    pub object: PatternItem,
}

impl PathPattern {
    /// Creates a new [PathPattern].
    pub fn new(
        subject: impl Into<PatternItem>,
        path: PropertyPathExpression,
        object: impl Into<PatternItem>,
    ) -> Self {
        Self {
            subject: subject.into(),
            path,
            object: object.into(),
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        [&self.subject, &self.object]
            .into_iter()
            .filter_map(PatternItem::variable)
    }

    pub fn has_no_blank_variables(&self) -> bool {
        !self.subject.is_blank_variable() && !self.object.is_blank_variable()
    }
}

impl Display for PathPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.path, self.object)
    }
}

/// A single pattern of a basic graph pattern.
///
/// Besides plain [MatchPattern]s, a basic graph pattern may embed filters, assignments, sub-queries,
/// property paths, and property functions. These patterns keep their position within the basic
/// graph pattern, as they may depend on variables that are bound by the patterns before them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriplePattern {
    Match(MatchPattern),
    Filter(Expression),
    BindAssignment {
        variable: Variable,
        expression: Expression,
    },
    LetAssignment {
        variable: Variable,
        expression: Expression,
    },
    SubQuery(Arc<Query>),
    Path(PathPattern),
    PropertyFunction(PropertyFunctionPattern),
}

impl TriplePattern {
    pub fn pattern_type(&self) -> TriplePatternType {
        match self {
            TriplePattern::Match(_) => TriplePatternType::Match,
            TriplePattern::Filter(_) => TriplePatternType::Filter,
            TriplePattern::BindAssignment { .. } => TriplePatternType::BindAssignment,
            TriplePattern::LetAssignment { .. } => TriplePatternType::LetAssignment,
            TriplePattern::SubQuery(_) => TriplePatternType::SubQuery,
            TriplePattern::Path(_) => TriplePatternType::Path,
            TriplePattern::PropertyFunction(_) => TriplePatternType::PropertyFunction,
        }
    }

    pub fn as_match(&self) -> Option<&MatchPattern> {
        match self {
            TriplePattern::Match(pattern) => Some(pattern),
            _ => None,
        }
    }

    /// Returns the variables that are used by this pattern.
    pub fn variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        match self {
            TriplePattern::Match(pattern) => push_unique(&mut result, pattern.variables().cloned()),
            TriplePattern::Filter(expression) => push_unique(&mut result, expression.variables()),
            TriplePattern::BindAssignment {
                variable,
                expression,
            }
            | TriplePattern::LetAssignment {
                variable,
                expression,
            } => {
                push_unique(&mut result, expression.variables());
                push_unique(&mut result, [variable.clone()]);
            }
            TriplePattern::SubQuery(query) => push_unique(&mut result, query.projected_variables()),
            TriplePattern::Path(pattern) => push_unique(&mut result, pattern.variables().cloned()),
            TriplePattern::PropertyFunction(pattern) => {
                push_unique(&mut result, pattern.variables().cloned());
            }
        }
        result
    }

    /// Returns the variables that are bound in every solution of this pattern.
    ///
    /// Filters only restrict solutions and assignments may leave their variable unbound if the
    /// expression raises an error.
    pub fn fixed_variables(&self) -> Vec<Variable> {
        match self {
            TriplePattern::Match(_) | TriplePattern::Path(_) | TriplePattern::PropertyFunction(_) => {
                self.variables()
            }
            TriplePattern::Filter(_)
            | TriplePattern::BindAssignment { .. }
            | TriplePattern::LetAssignment { .. }
            | TriplePattern::SubQuery(_) => Vec::new(),
        }
    }

    /// Returns true if no position of this pattern holds a blank node variable.
    pub fn has_no_blank_variables(&self) -> bool {
        match self {
            TriplePattern::Match(pattern) => pattern.has_no_blank_variables(),
            TriplePattern::Path(pattern) => pattern.has_no_blank_variables(),
            TriplePattern::PropertyFunction(pattern) => pattern.has_no_blank_variables(),
            TriplePattern::Filter(_)
            | TriplePattern::BindAssignment { .. }
            | TriplePattern::LetAssignment { .. }
            | TriplePattern::SubQuery(_) => true,
        }
    }
}

impl From<MatchPattern> for TriplePattern {
    fn from(value: MatchPattern) -> Self {
        TriplePattern::Match(value)
    }
}

impl Display for TriplePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TriplePattern::Match(pattern) => pattern.fmt(f),
            TriplePattern::Filter(expression) => write!(f, "FILTER {expression}"),
            TriplePattern::BindAssignment {
                variable,
                expression,
            } => write!(f, "BIND({expression} AS {variable})"),
            TriplePattern::LetAssignment {
                variable,
                expression,
            } => write!(f, "LET({variable} := {expression})"),
            TriplePattern::SubQuery(query) => {
                write!(f, "SUBQUERY({})", query.projected_variables().iter().join(" "))
            }
            TriplePattern::Path(pattern) => pattern.fmt(f),
            TriplePattern::PropertyFunction(pattern) => pattern.fmt(f),
        }
    }
}
