//! Lowers parsed SPARQL queries and updates into the algebra of the optimiser.

mod error;
mod rewriting;

pub use error::SparqlError;
pub use rewriting::GraphPatternRewriter;
pub use spargebra::SparqlSyntaxError;

use rdf_rewrite_algebra::{Query, UpdateCommandSet};
use rdf_rewrite_optimiser::reorder::QueryOptimiser;

/// Parses `query` and lowers it into a [Query].
///
/// The patterns of every basic graph pattern are ordered by `query_optimiser`.
pub fn parse_query(
    query: &str,
    base_iri: Option<&str>,
    query_optimiser: &QueryOptimiser,
) -> Result<Query, SparqlError> {
    let query = spargebra::Query::parse(query, base_iri)?;
    Ok(GraphPatternRewriter::new(query_optimiser.clone()).rewrite_query(&query)?)
}

/// Parses `update` and lowers it into an [UpdateCommandSet].
pub fn parse_update(
    update: &str,
    base_iri: Option<&str>,
    query_optimiser: &QueryOptimiser,
) -> Result<UpdateCommandSet, SparqlError> {
    let update = spargebra::Update::parse(update, base_iri)?;
    Ok(GraphPatternRewriter::new(query_optimiser.clone()).rewrite_update(&update)?)
}
