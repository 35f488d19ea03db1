use crate::expr::{AggregateExpression, Expression, OrderExpression};

/// Rewrites primary expressions within an expression tree.
///
/// Implementors only decide what happens to primary expressions (variables, constants, `BOUND`,
/// `EXISTS`). The provided [Self::transform] walks the expression tree and rebuilds every
/// composite expression around the transformed primaries.
pub trait ExpressionTransformer {
    /// The error that signals that the expression cannot be transformed.
    type Error;

    /// Transforms a primary expression.
    fn transform_primary(&self, expression: Expression) -> Result<Expression, Self::Error>;

    /// Transforms an expression tree.
    fn transform(&self, expression: Expression) -> Result<Expression, Self::Error> {
        let boxed = |expression: Box<Expression>| self.transform(*expression).map(Box::new);
        let all = |expressions: Vec<Expression>| {
            expressions
                .into_iter()
                .map(|expression| self.transform(expression))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(match expression {
            Expression::Variable(_)
            | Expression::Constant(_)
            | Expression::Virtual(_)
            | Expression::Exists(_)
            | Expression::Bound(_) => self.transform_primary(expression)?,
            Expression::Or(lhs, rhs) => Expression::Or(boxed(lhs)?, boxed(rhs)?),
            Expression::And(lhs, rhs) => Expression::And(boxed(lhs)?, boxed(rhs)?),
            Expression::Equal(lhs, rhs) => Expression::Equal(boxed(lhs)?, boxed(rhs)?),
            Expression::SameTerm(lhs, rhs) => Expression::SameTerm(boxed(lhs)?, boxed(rhs)?),
            Expression::Greater(lhs, rhs) => Expression::Greater(boxed(lhs)?, boxed(rhs)?),
            Expression::GreaterOrEqual(lhs, rhs) => {
                Expression::GreaterOrEqual(boxed(lhs)?, boxed(rhs)?)
            }
            Expression::Less(lhs, rhs) => Expression::Less(boxed(lhs)?, boxed(rhs)?),
            Expression::LessOrEqual(lhs, rhs) => Expression::LessOrEqual(boxed(lhs)?, boxed(rhs)?),
            Expression::In(lhs, rhs) => Expression::In(boxed(lhs)?, all(rhs)?),
            Expression::Add(lhs, rhs) => Expression::Add(boxed(lhs)?, boxed(rhs)?),
            Expression::Subtract(lhs, rhs) => Expression::Subtract(boxed(lhs)?, boxed(rhs)?),
            Expression::Multiply(lhs, rhs) => Expression::Multiply(boxed(lhs)?, boxed(rhs)?),
            Expression::Divide(lhs, rhs) => Expression::Divide(boxed(lhs)?, boxed(rhs)?),
            Expression::UnaryPlus(inner) => Expression::UnaryPlus(boxed(inner)?),
            Expression::UnaryMinus(inner) => Expression::UnaryMinus(boxed(inner)?),
            Expression::Not(inner) => Expression::Not(boxed(inner)?),
            Expression::If(test, if_true, if_false) => {
                Expression::If(boxed(test)?, boxed(if_true)?, boxed(if_false)?)
            }
            Expression::Coalesce(args) => Expression::Coalesce(all(args)?),
            Expression::FunctionCall(function, args) => Expression::FunctionCall(function, all(args)?),
        })
    }

    /// Transforms the expression of an ordering condition.
    fn transform_order(&self, expression: OrderExpression) -> Result<OrderExpression, Self::Error> {
        Ok(match expression {
            OrderExpression::Asc(inner) => OrderExpression::Asc(self.transform(inner)?),
            OrderExpression::Desc(inner) => OrderExpression::Desc(self.transform(inner)?),
        })
    }

    /// Transforms the argument of an aggregate.
    fn transform_aggregate(
        &self,
        expression: AggregateExpression,
    ) -> Result<AggregateExpression, Self::Error> {
        Ok(match expression {
            AggregateExpression::CountSolutions { distinct } => {
                AggregateExpression::CountSolutions { distinct }
            }
            AggregateExpression::FunctionCall {
                name,
                expression,
                distinct,
            } => AggregateExpression::FunctionCall {
                name,
                expression: self.transform(expression)?,
                distinct,
            },
        })
    }
}
