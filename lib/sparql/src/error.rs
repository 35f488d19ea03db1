use datafusion::error::DataFusionError;
use spargebra::SparqlSyntaxError;

/// An error raised while turning SPARQL text into an algebra.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SparqlError {
    /// The text is not valid SPARQL.
    #[error(transparent)]
    Syntax(#[from] SparqlSyntaxError),
    /// The query uses a construct that has no representation in the algebra.
    #[error(transparent)]
    Lowering(#[from] DataFusionError),
}
