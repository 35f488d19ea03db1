use datafusion::error::DataFusionError;
use rdf_rewrite_model::{Literal, NamedNode, Term, Variable};

/// The result of a rewrite that may not be applicable to a part of the algebra.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Signals that a rewrite is not possible for a part of the algebra.
///
/// These errors are expected. The optimiser that attempted the rewrite catches them and falls back
/// to a less aggressive rewrite or keeps its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RewriteError {
    #[error("Cannot substitute variables inside a SERVICE clause")]
    Service,
    #[error("Cannot substitute variables inside a sub-query")]
    SubQuery,
    #[error("Cannot substitute variables inside a property path")]
    PropertyPath,
    #[error("Cannot substitute variables inside a property function")]
    PropertyFunction,
    #[error("Cannot substitute variables inside a VALUES clause")]
    Values,
    #[error("Cannot substitute {0} across a grouping")]
    Group(Variable),
    #[error("Cannot substitute {0} across a projection")]
    Projection(Variable),
    #[error("Cannot substitute variables across a LIMIT or OFFSET")]
    Slice,
    #[error("Cannot substitute {0} because it is shared with the right-hand side of a MINUS")]
    Minus(Variable),
    #[error("Cannot substitute {0} into the object position of a triple pattern")]
    ObjectPosition(Variable),
    #[error("Cannot substitute {0} because it is the target of an assignment")]
    AssignmentTarget(Variable),
    #[error("Cannot substitute the graph variable {0} with another variable")]
    GraphVariable(Variable),
    #[error("The term {0} cannot be used as a graph name")]
    InvalidGraphName(Term),
    #[error("The algebra is not a product of variable-disjoint parts")]
    NotAProduct,
}

impl From<RewriteError> for DataFusionError {
    fn from(error: RewriteError) -> Self {
        DataFusionError::External(Box::new(error))
    }
}

/// An error caused by misconfiguring an optimiser pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OptimiserError {
    #[error("An optimiser with the name '{0}' is already registered")]
    DuplicateOptimiser(String),
}

/// An error raised while reading a statistics graph.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("The statistic {predicate} of {subject} must be a literal but was {object}")]
    NotALiteral {
        subject: Term,
        predicate: NamedNode,
        object: Term,
    },
    #[error("The statistic {predicate} of {subject} is not a non-negative integer: {value}")]
    InvalidCount {
        subject: Term,
        predicate: NamedNode,
        value: Literal,
    },
}
