use crate::algebra::push_unique;
use crate::expr::{AggregateExpression, Expression, OrderExpression};
use crate::patterns::TriplePattern;
use crate::Algebra;
use rdf_rewrite_model::{Term, Variable};

/// The form of a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Ask,
    Construct,
    Describe,
}

/// The inline solutions of a trailing `VALUES` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings {
    variables: Vec<Variable>,
    rows: Vec<Vec<Option<Term>>>,
}

impl Bindings {
    /// Creates new [Bindings].
    pub fn new(variables: Vec<Variable>, rows: Vec<Vec<Option<Term>>>) -> Self {
        Self { variables, rows }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn rows(&self) -> &[Vec<Option<Term>>] {
        &self.rows
    }
}

/// A parsed query.
///
/// The query holds the graph pattern of its `WHERE` clause and its solution modifiers separately.
/// [Query::to_algebra] combines both into the algebra tree that is handed to the optimisers. The
/// solution modifiers are used by the optimisers to decide whether they are applicable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    query_type: QueryType,
    pattern: Algebra,
    variables: Option<Vec<Variable>>,
    projections: Vec<(Variable, Expression)>,
    distinct: bool,
    reduced: bool,
    order_by: Option<Vec<OrderExpression>>,
    group_by: Option<Vec<Variable>>,
    aggregates: Vec<(Variable, AggregateExpression)>,
    having: Option<Expression>,
    bindings: Option<Bindings>,
    limit: Option<usize>,
    offset: usize,
}

impl Query {
    /// Creates a new query without any solution modifiers (`SELECT *`).
    pub fn new(query_type: QueryType, pattern: Algebra) -> Self {
        Self {
            query_type,
            pattern,
            variables: None,
            projections: Vec::new(),
            distinct: false,
            reduced: false,
            order_by: None,
            group_by: None,
            aggregates: Vec::new(),
            having: None,
            bindings: None,
            limit: None,
            offset: 0,
        }
    }

    /// Projects the given `variables` instead of all variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Adds a projection expression (`SELECT (expression AS ?variable)`).
    #[must_use]
    pub fn with_projection(mut self, variable: Variable, expression: Expression) -> Self {
        self.projections.push((variable, expression));
        self
    }

    #[must_use]
    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn with_reduced(mut self) -> Self {
        self.reduced = true;
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, ordering: Vec<OrderExpression>) -> Self {
        self.order_by = Some(ordering);
        self
    }

    #[must_use]
    pub fn with_group_by(mut self, variables: Vec<Variable>) -> Self {
        self.group_by = Some(variables);
        self
    }

    #[must_use]
    pub fn with_aggregate(mut self, variable: Variable, aggregate: AggregateExpression) -> Self {
        self.aggregates.push((variable, aggregate));
        self
    }

    #[must_use]
    pub fn with_having(mut self, expression: Expression) -> Self {
        self.having = Some(expression);
        self
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = Some(bindings);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// The graph pattern of the `WHERE` clause.
    pub fn pattern(&self) -> &Algebra {
        &self.pattern
    }

    /// Returns true for `SELECT *`.
    pub fn is_select_all(&self) -> bool {
        self.variables.is_none()
    }

    pub fn projections(&self) -> &[(Variable, Expression)] {
        &self.projections
    }

    pub fn order_by(&self) -> Option<&[OrderExpression]> {
        self.order_by.as_deref()
    }

    pub fn group_by(&self) -> Option<&[Variable]> {
        self.group_by.as_deref()
    }

    pub fn aggregates(&self) -> &[(Variable, AggregateExpression)] {
        &self.aggregates
    }

    pub fn having(&self) -> Option<&Expression> {
        self.having.as_ref()
    }

    pub fn bindings(&self) -> Option<&Bindings> {
        self.bindings.as_ref()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the query has a `DISTINCT` or `REDUCED` modifier.
    pub fn has_distinct_modifier(&self) -> bool {
        self.distinct || self.reduced
    }

    /// Returns true if the query has solution modifiers besides its projection.
    pub fn has_solution_modifiers(&self) -> bool {
        self.has_distinct_modifier()
            || self.order_by.is_some()
            || self.is_aggregate()
            || self.having.is_some()
            || self.bindings.is_some()
            || self.limit.is_some()
            || self.offset > 0
    }

    /// Returns true if the query groups its solutions.
    pub fn is_aggregate(&self) -> bool {
        self.group_by.is_some() || !self.aggregates.is_empty()
    }

    /// Returns true if the query is unordered, or if it is ordered by plain variables that are all
    /// bound by the first pattern of the query.
    ///
    /// Solutions of such queries come out of the first pattern in the requested order, so a lazy
    /// evaluation that stops early still produces the correct prefix of solutions.
    pub fn is_optimisable_order_by(&self) -> bool {
        let Some(ordering) = &self.order_by else {
            return true;
        };
        if !ordering.iter().all(OrderExpression::is_simple) {
            return false;
        }

        let Some(patterns) = leading_patterns(&self.pattern) else {
            return false;
        };
        let Some(first) = patterns.first() else {
            return true;
        };
        let TriplePattern::Match(first) = first else {
            return false;
        };
        ordering
            .iter()
            .filter_map(|ordering| ordering.expression().as_variable())
            .all(|variable| first.variables().any(|v| v == variable))
    }

    /// Returns the variables that are returned by the query.
    pub fn projected_variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        match &self.variables {
            Some(variables) => push_unique(&mut result, variables.iter().cloned()),
            None => {
                if self.is_aggregate() {
                    push_unique(&mut result, self.group_by.iter().flatten().cloned());
                    push_unique(
                        &mut result,
                        self.aggregates.iter().map(|(variable, _)| variable.clone()),
                    );
                } else {
                    push_unique(&mut result, self.pattern.variables());
                }
                if let Some(bindings) = &self.bindings {
                    push_unique(&mut result, bindings.variables.iter().cloned());
                }
                push_unique(
                    &mut result,
                    self.projections.iter().map(|(variable, _)| variable.clone()),
                );
            }
        }
        result
    }

    /// Builds the unoptimised algebra of this query.
    ///
    /// The solution modifiers are applied in the order: `GROUP BY`, `HAVING`, `VALUES`, projection
    /// expressions, `ORDER BY`, projection, `DISTINCT`/`REDUCED`, `LIMIT`/`OFFSET`.
    pub fn to_algebra(&self) -> Algebra {
        let mut algebra = self.pattern.clone();
        if self.is_aggregate() {
            algebra = Algebra::Group {
                inner: algebra.into(),
                variables: self.group_by.clone().unwrap_or_default(),
                aggregates: self.aggregates.clone(),
            };
        }
        if let Some(having) = &self.having {
            algebra = Algebra::Having {
                inner: algebra.into(),
                expression: having.clone(),
            };
        }
        if let Some(bindings) = &self.bindings {
            algebra = Algebra::join(
                algebra,
                Algebra::Values {
                    variables: bindings.variables.clone(),
                    bindings: bindings.rows.clone(),
                },
            );
        }

        if self.query_type == QueryType::Ask {
            return algebra;
        }

        for (variable, expression) in &self.projections {
            algebra = Algebra::extend(algebra, variable.clone(), expression.clone());
        }
        if let Some(ordering) = &self.order_by {
            algebra = Algebra::order_by(algebra, ordering.clone());
        }

        if matches!(self.query_type, QueryType::Select | QueryType::Describe) {
            algebra = Algebra::Select {
                variables: self.projected_variables(),
                inner: algebra.into(),
                select_all: self.is_select_all(),
            };
        }
        if self.distinct {
            algebra = Algebra::distinct(algebra);
        } else if self.reduced {
            algebra = Algebra::reduced(algebra);
        }
        if self.limit.is_some() || self.offset > 0 {
            algebra = Algebra::slice(algebra, self.limit, self.offset);
        }
        algebra
    }
}

/// Returns the basic graph pattern whose solutions drive the evaluation of `algebra`.
fn leading_patterns(algebra: &Algebra) -> Option<&[TriplePattern]> {
    match algebra {
        Algebra::Filter { inner, .. } | Algebra::Extend { inner, .. } => leading_patterns(inner),
        Algebra::Join { lhs, .. } | Algebra::LeftJoin { lhs, .. } => leading_patterns(lhs),
        other => other.patterns(),
    }
}
