use crate::rewriting::GraphPatternRewriter;
use datafusion::error::Result as DFResult;
use rdf_rewrite_algebra::expr::{AggregateExpression, Expression, OrderExpression};
use spargebra::algebra as sparql;
use std::sync::Arc;

pub(super) struct ExpressionRewriter<'rewriter> {
    graph_rewriter: &'rewriter GraphPatternRewriter,
}

impl<'rewriter> ExpressionRewriter<'rewriter> {
    pub fn new(graph_rewriter: &'rewriter GraphPatternRewriter) -> Self {
        Self { graph_rewriter }
    }

    /// Rewrites an [sparql::Expression].
    ///
    /// The pattern of an `EXISTS` is lowered with the same rewriter as the surrounding pattern.
    pub fn rewrite(&self, expression: &sparql::Expression) -> DFResult<Expression> {
        Ok(match expression {
            sparql::Expression::NamedNode(node) => Expression::from(node.clone()),
            sparql::Expression::Literal(literal) => Expression::from(literal.clone()),
            sparql::Expression::Variable(variable) => Expression::Variable(variable.clone()),
            sparql::Expression::Or(lhs, rhs) => Expression::Or(self.boxed(lhs)?, self.boxed(rhs)?),
            sparql::Expression::And(lhs, rhs) => {
                Expression::And(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::Equal(lhs, rhs) => {
                Expression::Equal(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::SameTerm(lhs, rhs) => {
                Expression::SameTerm(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::Greater(lhs, rhs) => {
                Expression::Greater(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::GreaterOrEqual(lhs, rhs) => {
                Expression::GreaterOrEqual(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::Less(lhs, rhs) => {
                Expression::Less(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::LessOrEqual(lhs, rhs) => {
                Expression::LessOrEqual(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::In(lhs, rhs) => Expression::In(self.boxed(lhs)?, self.all(rhs)?),
            sparql::Expression::Add(lhs, rhs) => {
                Expression::Add(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::Subtract(lhs, rhs) => {
                Expression::Subtract(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::Multiply(lhs, rhs) => {
                Expression::Multiply(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::Divide(lhs, rhs) => {
                Expression::Divide(self.boxed(lhs)?, self.boxed(rhs)?)
            }
            sparql::Expression::UnaryPlus(inner) => Expression::UnaryPlus(self.boxed(inner)?),
            sparql::Expression::UnaryMinus(inner) => Expression::UnaryMinus(self.boxed(inner)?),
            sparql::Expression::Not(inner) => Expression::Not(self.boxed(inner)?),
            sparql::Expression::Exists(pattern) => {
                let pattern = self.graph_rewriter.rewrite_ordered_pattern(pattern)?;
                Expression::Exists(Arc::new(pattern))
            }
            sparql::Expression::Bound(variable) => Expression::Bound(variable.clone()),
            sparql::Expression::If(test, if_true, if_false) => Expression::If(
                self.boxed(test)?,
                self.boxed(if_true)?,
                self.boxed(if_false)?,
            ),
            sparql::Expression::Coalesce(args) => Expression::Coalesce(self.all(args)?),
            sparql::Expression::FunctionCall(function, args) => {
                Expression::FunctionCall(function.clone(), self.all(args)?)
            }
        })
    }

    pub fn rewrite_order(&self, ordering: &sparql::OrderExpression) -> DFResult<OrderExpression> {
        Ok(match ordering {
            sparql::OrderExpression::Asc(expression) => {
                OrderExpression::Asc(self.rewrite(expression)?)
            }
            sparql::OrderExpression::Desc(expression) => {
                OrderExpression::Desc(self.rewrite(expression)?)
            }
        })
    }

    pub fn rewrite_aggregate(
        &self,
        aggregate: &sparql::AggregateExpression,
    ) -> DFResult<AggregateExpression> {
        Ok(match aggregate {
            sparql::AggregateExpression::CountSolutions { distinct } => {
                AggregateExpression::CountSolutions {
                    distinct: *distinct,
                }
            }
            sparql::AggregateExpression::FunctionCall {
                name,
                expr,
                distinct,
            } => AggregateExpression::FunctionCall {
                name: name.clone(),
                expression: self.rewrite(expr)?,
                distinct: *distinct,
            },
        })
    }

    fn boxed(&self, expression: &sparql::Expression) -> DFResult<Box<Expression>> {
        self.rewrite(expression).map(Box::new)
    }

    fn all(&self, expressions: &[sparql::Expression]) -> DFResult<Vec<Expression>> {
        expressions
            .iter()
            .map(|expression| self.rewrite(expression))
            .collect()
    }
}
