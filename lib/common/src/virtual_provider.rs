use rdf_rewrite_model::{NodeId, TermRef};
use std::fmt::Debug;

/// Maps terms to the identifiers of an external, id-based storage layer.
///
/// Lookups are expected to be cheap (e.g., an in-memory dictionary) as they are done while
/// optimising a query.
pub trait VirtualRdfProvider: Debug + Send + Sync {
    /// Returns the id of `term`, or [None] if the term is unknown to the storage layer.
    fn get_id(&self, term: TermRef<'_>) -> Option<NodeId>;

    /// The id that the storage layer uses to signal an unknown term.
    fn null_id(&self) -> NodeId;

    /// Returns the id of `term` if it is a valid id (i.e., it is not the [Self::null_id]).
    fn try_get_id(&self, term: TermRef<'_>) -> Option<NodeId> {
        self.get_id(term).filter(|id| *id != self.null_id())
    }
}
