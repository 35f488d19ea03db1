//! Scalar expressions used by filters, assignments, orderings, and aggregates.

mod transformer;

pub use transformer::ExpressionTransformer;

use crate::algebra::push_unique;
use crate::Algebra;
use itertools::Itertools;
use rdf_rewrite_model::{
    AggregateFunction, Function, Literal, NamedNode, Term, TermRef, Variable, VirtualNode,
};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A scalar expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    Variable(Variable),
    Constant(Term),
    /// A constant that has been replaced by its storage id.
    Virtual(VirtualNode),
    Or(Box<Self>, Box<Self>),
    And(Box<Self>, Box<Self>),
    Equal(Box<Self>, Box<Self>),
    SameTerm(Box<Self>, Box<Self>),
    Greater(Box<Self>, Box<Self>),
    GreaterOrEqual(Box<Self>, Box<Self>),
    Less(Box<Self>, Box<Self>),
    LessOrEqual(Box<Self>, Box<Self>),
    In(Box<Self>, Vec<Self>),
    Add(Box<Self>, Box<Self>),
    Subtract(Box<Self>, Box<Self>),
    Multiply(Box<Self>, Box<Self>),
    Divide(Box<Self>, Box<Self>),
    UnaryPlus(Box<Self>),
    UnaryMinus(Box<Self>),
    Not(Box<Self>),
    Exists(Arc<Algebra>),
    Bound(Variable),
    If(Box<Self>, Box<Self>, Box<Self>),
    Coalesce(Vec<Self>),
    FunctionCall(Function, Vec<Self>),
}

impl Expression {
    pub fn equal(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Self::Equal(Box::new(lhs.into()), Box::new(rhs.into()))
    }

    pub fn same_term(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Self::SameTerm(Box::new(lhs.into()), Box::new(rhs.into()))
    }

    pub fn and(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Self::And(Box::new(lhs.into()), Box::new(rhs.into()))
    }

    pub fn add(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Self::Add(Box::new(lhs.into()), Box::new(rhs.into()))
    }

    /// Returns true if this expression has no scalar sub-expressions.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            Expression::Variable(_)
                | Expression::Constant(_)
                | Expression::Virtual(_)
                | Expression::Exists(_)
                | Expression::Bound(_)
        )
    }

    /// Returns the term of a constant (or virtualized constant) expression.
    pub fn as_constant(&self) -> Option<TermRef<'_>> {
        match self {
            Expression::Constant(term) => Some(term.as_ref()),
            Expression::Virtual(node) => Some(node.term().as_ref()),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Expression::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Returns the variables used within this expression, including the variables of nested
    /// `EXISTS` patterns.
    pub fn variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        self.collect_variables(&mut result);
        result
    }

    fn collect_variables(&self, result: &mut Vec<Variable>) {
        match self {
            Expression::Variable(variable) | Expression::Bound(variable) => {
                push_unique(result, [variable.clone()]);
            }
            Expression::Constant(_) | Expression::Virtual(_) => {}
            Expression::Or(lhs, rhs)
            | Expression::And(lhs, rhs)
            | Expression::Equal(lhs, rhs)
            | Expression::SameTerm(lhs, rhs)
            | Expression::Greater(lhs, rhs)
            | Expression::GreaterOrEqual(lhs, rhs)
            | Expression::Less(lhs, rhs)
            | Expression::LessOrEqual(lhs, rhs)
            | Expression::Add(lhs, rhs)
            | Expression::Subtract(lhs, rhs)
            | Expression::Multiply(lhs, rhs)
            | Expression::Divide(lhs, rhs) => {
                lhs.collect_variables(result);
                rhs.collect_variables(result);
            }
            Expression::In(lhs, rhs) => {
                lhs.collect_variables(result);
                for expression in rhs {
                    expression.collect_variables(result);
                }
            }
            Expression::UnaryPlus(inner) | Expression::UnaryMinus(inner) | Expression::Not(inner) => {
                inner.collect_variables(result);
            }
            Expression::Exists(pattern) => push_unique(result, pattern.variables()),
            Expression::If(test, if_true, if_false) => {
                test.collect_variables(result);
                if_true.collect_variables(result);
                if_false.collect_variables(result);
            }
            Expression::Coalesce(args) | Expression::FunctionCall(_, args) => {
                for expression in args {
                    expression.collect_variables(result);
                }
            }
        }
    }
}

impl From<Variable> for Expression {
    fn from(value: Variable) -> Self {
        Expression::Variable(value)
    }
}

impl From<Term> for Expression {
    fn from(value: Term) -> Self {
        Expression::Constant(value)
    }
}

impl From<NamedNode> for Expression {
    fn from(value: NamedNode) -> Self {
        Expression::Constant(value.into())
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Expression::Constant(value.into())
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Literal::from(value).into()
    }
}

fn fmt_binary(
    f: &mut Formatter<'_>,
    lhs: &Expression,
    operator: &str,
    rhs: &Expression,
) -> std::fmt::Result {
    write!(f, "({lhs} {operator} {rhs})")
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Variable(variable) => variable.fmt(f),
            Expression::Constant(term) => term.fmt(f),
            Expression::Virtual(node) => node.fmt(f),
            Expression::Or(lhs, rhs) => fmt_binary(f, lhs, "||", rhs),
            Expression::And(lhs, rhs) => fmt_binary(f, lhs, "&&", rhs),
            Expression::Equal(lhs, rhs) => fmt_binary(f, lhs, "=", rhs),
            Expression::SameTerm(lhs, rhs) => write!(f, "sameTerm({lhs}, {rhs})"),
            Expression::Greater(lhs, rhs) => fmt_binary(f, lhs, ">", rhs),
            Expression::GreaterOrEqual(lhs, rhs) => fmt_binary(f, lhs, ">=", rhs),
            Expression::Less(lhs, rhs) => fmt_binary(f, lhs, "<", rhs),
            Expression::LessOrEqual(lhs, rhs) => fmt_binary(f, lhs, "<=", rhs),
            Expression::In(lhs, rhs) => write!(f, "({lhs} IN ({}))", rhs.iter().join(", ")),
            Expression::Add(lhs, rhs) => fmt_binary(f, lhs, "+", rhs),
            Expression::Subtract(lhs, rhs) => fmt_binary(f, lhs, "-", rhs),
            Expression::Multiply(lhs, rhs) => fmt_binary(f, lhs, "*", rhs),
            Expression::Divide(lhs, rhs) => fmt_binary(f, lhs, "/", rhs),
            Expression::UnaryPlus(inner) => write!(f, "+{inner}"),
            Expression::UnaryMinus(inner) => write!(f, "-{inner}"),
            Expression::Not(inner) => write!(f, "!{inner}"),
            Expression::Exists(pattern) => write!(f, "EXISTS {{ {pattern:#} }}"),
            Expression::Bound(variable) => write!(f, "BOUND({variable})"),
            Expression::If(test, if_true, if_false) => {
                write!(f, "IF({test}, {if_true}, {if_false})")
            }
            Expression::Coalesce(args) => write!(f, "COALESCE({})", args.iter().join(", ")),
            Expression::FunctionCall(function, args) => {
                write!(f, "{function}({})", args.iter().join(", "))
            }
        }
    }
}

/// An ordering condition of an `ORDER BY` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderExpression {
    Asc(Expression),
    Desc(Expression),
}

impl OrderExpression {
    pub fn expression(&self) -> &Expression {
        match self {
            OrderExpression::Asc(expression) | OrderExpression::Desc(expression) => expression,
        }
    }

    /// Returns true if this ordering condition sorts by a plain variable.
    pub fn is_simple(&self) -> bool {
        self.expression().as_variable().is_some()
    }
}

impl Display for OrderExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderExpression::Asc(expression) => write!(f, "ASC({expression})"),
            OrderExpression::Desc(expression) => write!(f, "DESC({expression})"),
        }
    }
}

/// An aggregate computed by a `GROUP BY`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregateExpression {
    /// `COUNT(*)`
    CountSolutions { distinct: bool },
    FunctionCall {
        name: AggregateFunction,
        expression: Expression,
        distinct: bool,
    },
}

impl AggregateExpression {
    pub fn variables(&self) -> Vec<Variable> {
        match self {
            AggregateExpression::CountSolutions { .. } => Vec::new(),
            AggregateExpression::FunctionCall { expression, .. } => expression.variables(),
        }
    }
}

impl Display for AggregateExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let distinct = |distinct: bool| if distinct { "DISTINCT " } else { "" };
        match self {
            AggregateExpression::CountSolutions { distinct: d } => {
                write!(f, "COUNT({}*)", distinct(*d))
            }
            AggregateExpression::FunctionCall {
                name,
                expression,
                distinct: d,
            } => {
                let modifier = distinct(*d);
                match name {
                    AggregateFunction::Count => write!(f, "COUNT({modifier}{expression})"),
                    AggregateFunction::Sum => write!(f, "SUM({modifier}{expression})"),
                    AggregateFunction::Avg => write!(f, "AVG({modifier}{expression})"),
                    AggregateFunction::Min => write!(f, "MIN({modifier}{expression})"),
                    AggregateFunction::Max => write!(f, "MAX({modifier}{expression})"),
                    AggregateFunction::Sample => write!(f, "SAMPLE({modifier}{expression})"),
                    AggregateFunction::GroupConcat { separator } => match separator {
                        Some(separator) => write!(
                            f,
                            "GROUP_CONCAT({modifier}{expression}; SEPARATOR = {})",
                            Literal::new_simple_literal(separator.as_str())
                        ),
                        None => write!(f, "GROUP_CONCAT({modifier}{expression})"),
                    },
                    AggregateFunction::Custom(name) => write!(f, "{name}({modifier}{expression})"),
                }
            }
        }
    }
}
