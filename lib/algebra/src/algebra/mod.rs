mod display;
mod tree_node;
mod variables;

use crate::expr::{AggregateExpression, Expression, OrderExpression};
use crate::patterns::{PathPattern, PropertyFunctionPattern, TriplePattern};
use crate::Query;
use rdf_rewrite_model::{NamedNodePattern, Term, Variable};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// A node of the algebra tree.
///
/// The tree is logically immutable. Children are reference-counted such that rewrites can share
/// unchanged subtrees with their input. Every rewrite produces a new tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Algebra {
    /// A basic graph pattern.
    Bgp { patterns: Vec<TriplePattern> },
    /// A basic graph pattern that may stop once `required_results` solutions have been produced.
    ///
    /// If `required_results` is [None], the evaluator determines the number from the query.
    LazyBgp {
        patterns: Vec<TriplePattern>,
        required_results: Option<usize>,
    },
    /// A basic graph pattern that may stop after the first solution.
    AskBgp { patterns: Vec<TriplePattern> },
    /// An operator that never produces a solution.
    Null { variables: Vec<Variable> },
    /// Inline solutions (`VALUES`).
    Values {
        variables: Vec<Variable>,
        bindings: Vec<Vec<Option<Term>>>,
    },
    SubQuery { query: Arc<Query> },
    Service {
        name: NamedNodePattern,
        inner: Arc<Algebra>,
        silent: bool,
    },
    PropertyPath(PathPattern),
    Filter {
        inner: Arc<Algebra>,
        expression: Expression,
    },
    /// Keeps the solutions in which `variable` is equal to `term`.
    IdentityFilter {
        inner: Arc<Algebra>,
        variable: Variable,
        term: Expression,
    },
    /// Keeps the solutions in which `variable` is the same term as `term`.
    SameTermFilter {
        inner: Arc<Algebra>,
        variable: Variable,
        term: Expression,
    },
    Extend {
        inner: Arc<Algebra>,
        variable: Variable,
        expression: Expression,
    },
    Select {
        inner: Arc<Algebra>,
        variables: Vec<Variable>,
        select_all: bool,
    },
    Distinct { inner: Arc<Algebra> },
    Reduced { inner: Arc<Algebra> },
    OrderBy {
        inner: Arc<Algebra>,
        ordering: Vec<OrderExpression>,
    },
    Slice {
        inner: Arc<Algebra>,
        limit: Option<usize>,
        offset: usize,
    },
    Graph {
        inner: Arc<Algebra>,
        name: NamedNodePattern,
    },
    /// Applies a property function to the solutions of `inner`.
    PropertyFunction {
        inner: Arc<Algebra>,
        function: PropertyFunctionPattern,
    },
    Group {
        inner: Arc<Algebra>,
        variables: Vec<Variable>,
        aggregates: Vec<(Variable, AggregateExpression)>,
    },
    Having {
        inner: Arc<Algebra>,
        expression: Expression,
    },
    Join {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
    },
    LeftJoin {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
        filter: Option<Expression>,
    },
    Union {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
    },
    Minus {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
    },
    /// A join whose sides may be evaluated concurrently.
    ParallelJoin {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
    },
    /// A union whose sides may be evaluated concurrently.
    ParallelUnion {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
    },
    /// A union that may stop once `required_results` solutions have been produced.
    LazyUnion {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
        required_results: Option<usize>,
    },
    /// A union that may stop after the first solution.
    AskUnion {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
    },
    /// The product of two variable-disjoint sides that only keeps the solutions for which
    /// `expression` holds.
    FilteredProduct {
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
        expression: Expression,
    },
}

impl Algebra {
    /// Creates a basic graph pattern.
    pub fn bgp(patterns: impl IntoIterator<Item = impl Into<TriplePattern>>) -> Self {
        Algebra::Bgp {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates the empty basic graph pattern, which produces a single empty solution.
    pub fn empty() -> Self {
        Algebra::Bgp {
            patterns: Vec::new(),
        }
    }

    pub fn filter(inner: Algebra, expression: Expression) -> Self {
        Algebra::Filter {
            inner: Arc::new(inner),
            expression,
        }
    }

    pub fn extend(inner: Algebra, variable: Variable, expression: Expression) -> Self {
        Algebra::Extend {
            inner: Arc::new(inner),
            variable,
            expression,
        }
    }

    /// Projects `variables`.
    pub fn select(inner: Algebra, variables: Vec<Variable>) -> Self {
        Algebra::Select {
            inner: Arc::new(inner),
            variables,
            select_all: false,
        }
    }

    /// Projects all variables of `inner` (`SELECT *`).
    pub fn select_all(inner: Algebra) -> Self {
        Algebra::Select {
            variables: inner.variables(),
            inner: Arc::new(inner),
            select_all: true,
        }
    }

    pub fn distinct(inner: Algebra) -> Self {
        Algebra::Distinct {
            inner: Arc::new(inner),
        }
    }

    pub fn reduced(inner: Algebra) -> Self {
        Algebra::Reduced {
            inner: Arc::new(inner),
        }
    }

    pub fn order_by(inner: Algebra, ordering: Vec<OrderExpression>) -> Self {
        Algebra::OrderBy {
            inner: Arc::new(inner),
            ordering,
        }
    }

    pub fn slice(inner: Algebra, limit: Option<usize>, offset: usize) -> Self {
        Algebra::Slice {
            inner: Arc::new(inner),
            limit,
            offset,
        }
    }

    pub fn graph(inner: Algebra, name: impl Into<NamedNodePattern>) -> Self {
        Algebra::Graph {
            inner: Arc::new(inner),
            name: name.into(),
        }
    }

    /// Joins `lhs` and `rhs`. The empty basic graph pattern is the identity of the join.
    pub fn join(lhs: Algebra, rhs: Algebra) -> Self {
        if lhs.is_empty_bgp() {
            return rhs;
        }
        if rhs.is_empty_bgp() {
            return lhs;
        }
        Algebra::Join {
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        }
    }

    pub fn left_join(lhs: Algebra, rhs: Algebra, filter: Option<Expression>) -> Self {
        Algebra::LeftJoin {
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
            filter,
        }
    }

    pub fn union(lhs: Algebra, rhs: Algebra) -> Self {
        Algebra::Union {
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        }
    }

    pub fn minus(lhs: Algebra, rhs: Algebra) -> Self {
        Algebra::Minus {
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        }
    }

    pub fn filtered_product(lhs: Algebra, rhs: Algebra, expression: Expression) -> Self {
        Algebra::FilteredProduct {
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
            expression,
        }
    }

    /// Returns true if this is a basic graph pattern without any pattern.
    pub fn is_empty_bgp(&self) -> bool {
        matches!(self, Algebra::Bgp { patterns } if patterns.is_empty())
    }

    /// Returns the patterns of a (lazy) basic graph pattern.
    pub fn patterns(&self) -> Option<&[TriplePattern]> {
        match self {
            Algebra::Bgp { patterns }
            | Algebra::LazyBgp { patterns, .. }
            | Algebra::AskBgp { patterns } => Some(patterns),
            _ => None,
        }
    }

    /// Returns the direct child nodes.
    ///
    /// Sub-queries and `EXISTS` patterns are not children, as they open a new scope.
    pub fn children(&self) -> Vec<&Algebra> {
        match self {
            Algebra::Bgp { .. }
            | Algebra::LazyBgp { .. }
            | Algebra::AskBgp { .. }
            | Algebra::Null { .. }
            | Algebra::Values { .. }
            | Algebra::SubQuery { .. }
            | Algebra::PropertyPath(_) => Vec::new(),
            Algebra::Service { inner, .. }
            | Algebra::Filter { inner, .. }
            | Algebra::IdentityFilter { inner, .. }
            | Algebra::SameTermFilter { inner, .. }
            | Algebra::Extend { inner, .. }
            | Algebra::Select { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Reduced { inner }
            | Algebra::OrderBy { inner, .. }
            | Algebra::Slice { inner, .. }
            | Algebra::Graph { inner, .. }
            | Algebra::PropertyFunction { inner, .. }
            | Algebra::Group { inner, .. }
            | Algebra::Having { inner, .. } => vec![inner.as_ref()],
            Algebra::Join { lhs, rhs }
            | Algebra::LeftJoin { lhs, rhs, .. }
            | Algebra::Union { lhs, rhs }
            | Algebra::Minus { lhs, rhs }
            | Algebra::ParallelJoin { lhs, rhs }
            | Algebra::ParallelUnion { lhs, rhs }
            | Algebra::LazyUnion { lhs, rhs, .. }
            | Algebra::AskUnion { lhs, rhs }
            | Algebra::FilteredProduct { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
        }
    }
}

/// Returns true if `lhs` and `rhs` share no variable.
pub fn are_disjoint(lhs: &Algebra, rhs: &Algebra) -> bool {
    let lhs = lhs.variables().into_iter().collect::<FxHashSet<_>>();
    rhs.variables()
        .iter()
        .all(|variable| !lhs.contains(variable))
}

/// Appends the `variables` that are not yet part of `target`.
pub(crate) fn push_unique(target: &mut Vec<Variable>, variables: impl IntoIterator<Item = Variable>) {
    for variable in variables {
        if !target.contains(&variable) {
            target.push(variable);
        }
    }
}
