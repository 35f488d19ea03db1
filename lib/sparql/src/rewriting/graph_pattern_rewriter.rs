use crate::rewriting::expression_rewriter::ExpressionRewriter;
use datafusion::common::plan_err;
use datafusion::error::Result as DFResult;
use rdf_rewrite_algebra::patterns::{MatchPattern, PathPattern, PatternItem, TriplePattern};
use rdf_rewrite_algebra::{
    Algebra, Bindings, Query, QueryType, UpdateCommand, UpdateCommandSet, UpdateCommandType,
};
use rdf_rewrite_model::{Term, Variable};
use rdf_rewrite_optimiser::reorder::QueryOptimiser;
use spargebra::algebra::{AggregateExpression, Expression, GraphPattern};
use spargebra::term::{GroundTerm, NamedNodePattern, TermPattern};
use spargebra::GraphUpdateOperation;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lowers the graph patterns of [spargebra] into an [Algebra].
///
/// The solution modifiers at the top of a query are kept in the resulting [Query] instead of the
/// algebra, such that optimisers can inspect them. Nested queries become [Algebra::SubQuery]s. The
/// patterns of every basic graph pattern are ordered by the [QueryOptimiser], taking the variables
/// bound by the left-hand side of joins into account.
#[derive(Debug, Clone, Default)]
pub struct GraphPatternRewriter {
    query_optimiser: QueryOptimiser,
}

impl GraphPatternRewriter {
    pub fn new(query_optimiser: QueryOptimiser) -> Self {
        Self { query_optimiser }
    }

    /// Lowers `query`.
    ///
    /// The template of a `CONSTRUCT` and the resources of a `DESCRIBE` do not take part in the
    /// optimisation and are dropped.
    pub fn rewrite_query(&self, query: &spargebra::Query) -> DFResult<Query> {
        let (query_type, pattern) = match query {
            spargebra::Query::Select { pattern, .. } => (QueryType::Select, pattern),
            spargebra::Query::Construct { pattern, .. } => (QueryType::Construct, pattern),
            spargebra::Query::Describe { pattern, .. } => (QueryType::Describe, pattern),
            spargebra::Query::Ask { pattern, .. } => (QueryType::Ask, pattern),
        };
        debug!(?query_type, "Lowering query");
        self.rewrite_solution_modifiers(query_type, pattern)
    }

    /// Lowers every operation of `update`.
    pub fn rewrite_update(&self, update: &spargebra::Update) -> DFResult<UpdateCommandSet> {
        debug!(operations = update.operations.len(), "Lowering update");
        let commands = update
            .operations
            .iter()
            .map(|operation| self.rewrite_operation(operation))
            .collect::<DFResult<Vec<_>>>()?;
        Ok(UpdateCommandSet::new(commands))
    }

    fn rewrite_operation(&self, operation: &GraphUpdateOperation) -> DFResult<UpdateCommand> {
        Ok(match operation {
            GraphUpdateOperation::InsertData { .. } => {
                UpdateCommand::new(UpdateCommandType::InsertData)
            }
            GraphUpdateOperation::DeleteData { .. } => {
                UpdateCommand::new(UpdateCommandType::DeleteData)
            }
            GraphUpdateOperation::DeleteInsert { pattern, .. } => {
                UpdateCommand::new(UpdateCommandType::Modify)
                    .with_pattern(self.rewrite_ordered_pattern(pattern)?)
            }
            GraphUpdateOperation::Load { .. } => UpdateCommand::new(UpdateCommandType::Load),
            GraphUpdateOperation::Clear { .. } => UpdateCommand::new(UpdateCommandType::Clear),
            GraphUpdateOperation::Create { .. } => UpdateCommand::new(UpdateCommandType::Create),
            GraphUpdateOperation::Drop { .. } => UpdateCommand::new(UpdateCommandType::Drop),
        })
    }

    /// Peels the solution modifiers off `pattern`.
    ///
    /// The modifiers are nested in the order `LIMIT`/`OFFSET`, `DISTINCT`/`REDUCED`, projection,
    /// `ORDER BY`, projection expressions, `VALUES`, `HAVING`, `GROUP BY`, starting from the root.
    /// Projection expressions are only peeled off aggregate queries. Otherwise, they are
    /// indistinguishable from `BIND`s and stay in the pattern.
    fn rewrite_solution_modifiers(
        &self,
        query_type: QueryType,
        pattern: &GraphPattern,
    ) -> DFResult<Query> {
        let expressions = ExpressionRewriter::new(self);
        let mut pattern = pattern;

        let mut slice = None;
        if let GraphPattern::Slice {
            inner,
            start,
            length,
        } = pattern
        {
            slice = Some((*start, *length));
            pattern = inner;
        }

        let (distinct, reduced) = match pattern {
            GraphPattern::Distinct { inner } => {
                pattern = inner;
                (true, false)
            }
            GraphPattern::Reduced { inner } => {
                pattern = inner;
                (false, true)
            }
            _ => (false, false),
        };

        let mut variables = None;
        if let GraphPattern::Project {
            inner,
            variables: projected,
        } = pattern
        {
            variables = Some(projected);
            pattern = inner;
        }

        let mut ordering = None;
        if let GraphPattern::OrderBy { inner, expression } = pattern {
            ordering = Some(expression);
            pattern = inner;
        }

        let mut query = match peel_aggregation(pattern) {
            Some(aggregation) => self.rewrite_aggregation(query_type, &aggregation)?,
            None => match as_values_join(pattern) {
                Some((inner, variables, rows)) => {
                    Query::new(query_type, self.rewrite_ordered_pattern(inner)?)
                        .with_bindings(rewrite_bindings(variables, rows)?)
                }
                None => Query::new(query_type, self.rewrite_ordered_pattern(pattern)?),
            },
        };

        if let Some(variables) = variables {
            query = query.with_variables(variables.clone());
        }
        if let Some(ordering) = ordering {
            let ordering = ordering
                .iter()
                .map(|ordering| expressions.rewrite_order(ordering))
                .collect::<DFResult<Vec<_>>>()?;
            query = query.with_order_by(ordering);
        }
        if distinct {
            query = query.with_distinct();
        }
        if reduced {
            query = query.with_reduced();
        }
        if let Some((offset, limit)) = slice {
            query = query.with_offset(offset);
            if let Some(limit) = limit {
                query = query.with_limit(limit);
            }
        }
        Ok(query)
    }

    fn rewrite_aggregation(
        &self,
        query_type: QueryType,
        aggregation: &Aggregation<'_>,
    ) -> DFResult<Query> {
        let expressions = ExpressionRewriter::new(self);
        let mut query = Query::new(query_type, self.rewrite_ordered_pattern(aggregation.inner)?);

        // A query without GROUP BY clause but with aggregates forms a single group.
        if !aggregation.variables.is_empty() || aggregation.aggregates.is_empty() {
            query = query.with_group_by(aggregation.variables.to_vec());
        }
        for (variable, aggregate) in aggregation.aggregates {
            query = query.with_aggregate(variable.clone(), expressions.rewrite_aggregate(aggregate)?);
        }
        if let Some(having) = aggregation.having {
            query = query.with_having(expressions.rewrite(having)?);
        }
        if let Some((variables, rows)) = aggregation.values {
            query = query.with_bindings(rewrite_bindings(variables, rows)?);
        }
        for (variable, expression) in &aggregation.projections {
            query = query.with_projection((*variable).clone(), expressions.rewrite(expression)?);
        }
        Ok(query)
    }

    /// Lowers `pattern` and orders the patterns of its basic graph patterns.
    ///
    /// Used for patterns that are evaluated on their own: the pattern of a query or update, and the
    /// pattern of an `EXISTS`.
    pub(super) fn rewrite_ordered_pattern(&self, pattern: &GraphPattern) -> DFResult<Algebra> {
        let algebra = self.rewrite_graph_pattern(pattern)?;
        Ok(self.query_optimiser.optimise_algebra(algebra)?.data)
    }

    /// Lowers a graph pattern that is not at the root of a query.
    fn rewrite_graph_pattern(&self, pattern: &GraphPattern) -> DFResult<Algebra> {
        let expressions = ExpressionRewriter::new(self);
        Ok(match pattern {
            GraphPattern::Bgp { patterns } => {
                let patterns = patterns
                    .iter()
                    .map(|pattern| {
                        TriplePattern::Match(MatchPattern::new(
                            rewrite_term_pattern(&pattern.subject),
                            rewrite_named_node_pattern(&pattern.predicate),
                            rewrite_term_pattern(&pattern.object),
                        ))
                    })
                    .collect();
                Algebra::Bgp { patterns }
            }
            GraphPattern::Path {
                subject,
                path,
                object,
            } => Algebra::PropertyPath(PathPattern::new(
                rewrite_term_pattern(subject),
                path.clone(),
                rewrite_term_pattern(object),
            )),
            GraphPattern::Filter { expr, inner } => {
                let expression = expressions.rewrite(expr)?;
                match self.rewrite_graph_pattern(inner)? {
                    Algebra::Bgp { mut patterns } if !patterns.is_empty() => {
                        patterns.push(TriplePattern::Filter(expression));
                        Algebra::Bgp { patterns }
                    }
                    inner => Algebra::filter(inner, expression),
                }
            }
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let expression = expressions.rewrite(expression)?;
                match self.rewrite_graph_pattern(inner)? {
                    Algebra::Bgp { mut patterns } if !patterns.is_empty() => {
                        patterns.push(TriplePattern::BindAssignment {
                            variable: variable.clone(),
                            expression,
                        });
                        Algebra::Bgp { patterns }
                    }
                    inner => Algebra::extend(inner, variable.clone(), expression),
                }
            }
            GraphPattern::Join { left, right } => Algebra::join(
                self.rewrite_graph_pattern(left)?,
                self.rewrite_graph_pattern(right)?,
            ),
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => Algebra::left_join(
                self.rewrite_graph_pattern(left)?,
                self.rewrite_graph_pattern(right)?,
                expression
                    .as_ref()
                    .map(|expression| expressions.rewrite(expression))
                    .transpose()?,
            ),
            GraphPattern::Union { left, right } => Algebra::union(
                self.rewrite_graph_pattern(left)?,
                self.rewrite_graph_pattern(right)?,
            ),
            GraphPattern::Minus { left, right } => Algebra::minus(
                self.rewrite_graph_pattern(left)?,
                self.rewrite_graph_pattern(right)?,
            ),
            GraphPattern::Graph { name, inner } => {
                Algebra::graph(self.rewrite_graph_pattern(inner)?, name.clone())
            }
            GraphPattern::Service {
                name,
                inner,
                silent,
            } => Algebra::Service {
                name: name.clone(),
                inner: Arc::new(self.rewrite_graph_pattern(inner)?),
                silent: *silent,
            },
            GraphPattern::Values {
                variables,
                bindings,
            } => {
                let bindings = rewrite_bindings(variables, bindings)?;
                Algebra::Values {
                    variables: bindings.variables().to_vec(),
                    bindings: bindings.rows().to_vec(),
                }
            }
            GraphPattern::Project { .. }
            | GraphPattern::Distinct { .. }
            | GraphPattern::Reduced { .. }
            | GraphPattern::Slice { .. }
            | GraphPattern::OrderBy { .. }
            | GraphPattern::Group { .. } => {
                trace!("Lowering sub-query");
                let query = self.rewrite_solution_modifiers(QueryType::Select, pattern)?;
                Algebra::SubQuery {
                    query: Arc::new(query),
                }
            }
        })
    }
}

/// The aggregation part of a query: `GROUP BY`, `HAVING`, a trailing `VALUES`, and the projection
/// expressions that refer to the aggregates.
struct Aggregation<'pattern> {
    inner: &'pattern GraphPattern,
    variables: &'pattern [Variable],
    aggregates: &'pattern [(Variable, AggregateExpression)],
    having: Option<&'pattern Expression>,
    values: Option<(&'pattern [Variable], &'pattern [Vec<Option<GroundTerm>>])>,
    projections: Vec<(&'pattern Variable, &'pattern Expression)>,
}

fn peel_aggregation(pattern: &GraphPattern) -> Option<Aggregation<'_>> {
    let mut current = pattern;

    let mut projections = Vec::new();
    while let GraphPattern::Extend {
        inner,
        variable,
        expression,
    } = current
    {
        projections.push((variable, expression));
        current = inner;
    }
    projections.reverse();

    let mut values = None;
    if let Some((inner, variables, rows)) = as_values_join(current) {
        values = Some((variables, rows));
        current = inner;
    }

    let mut having = None;
    if let GraphPattern::Filter { expr, inner } = current {
        if matches!(inner.as_ref(), GraphPattern::Group { .. }) {
            having = Some(expr);
            current = inner;
        }
    }

    let GraphPattern::Group {
        inner,
        variables,
        aggregates,
    } = current
    else {
        return None;
    };
    Some(Aggregation {
        inner,
        variables,
        aggregates,
        having,
        values,
        projections,
    })
}

/// Matches the join with the inline data of a trailing `VALUES` clause.
fn as_values_join(
    pattern: &GraphPattern,
) -> Option<(&GraphPattern, &[Variable], &[Vec<Option<GroundTerm>>])> {
    let GraphPattern::Join { left, right } = pattern else {
        return None;
    };
    let GraphPattern::Values {
        variables,
        bindings,
    } = right.as_ref()
    else {
        return None;
    };
    Some((left, variables, bindings))
}

fn rewrite_bindings(
    variables: &[Variable],
    rows: &[Vec<Option<GroundTerm>>],
) -> DFResult<Bindings> {
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() != variables.len() {
            return plan_err!(
                "VALUES row has {} entries but {} variables are declared",
                row.len(),
                variables.len()
            );
        }
        result.push(
            row.iter()
                .map(|term| term.as_ref().map(rewrite_ground_term))
                .collect(),
        );
    }
    Ok(Bindings::new(variables.to_vec(), result))
}

fn rewrite_ground_term(term: &GroundTerm) -> Term {
    match term {
        GroundTerm::NamedNode(node) => node.clone().into(),
        GroundTerm::Literal(literal) => literal.clone().into(),
    }
}

/// Blank nodes of a pattern act as variables that cannot be projected.
fn rewrite_term_pattern(pattern: &TermPattern) -> PatternItem {
    match pattern {
        TermPattern::NamedNode(node) => node.clone().into(),
        TermPattern::BlankNode(node) => PatternItem::BlankVariable(node.clone()),
        TermPattern::Literal(literal) => literal.clone().into(),
        TermPattern::Variable(variable) => variable.clone().into(),
    }
}

fn rewrite_named_node_pattern(pattern: &NamedNodePattern) -> PatternItem {
    match pattern {
        NamedNodePattern::NamedNode(node) => node.clone().into(),
        NamedNodePattern::Variable(variable) => variable.clone().into(),
    }
}
