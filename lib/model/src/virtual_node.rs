use oxrdf::Term;
use std::fmt::{Display, Formatter};

/// The identifier of a term in an external, id-based storage layer.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new [NodeId].
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An opaque surrogate for a term that is known to an external storage layer.
///
/// The node keeps the materialized term around such that the algebra can still be displayed and
/// compared with regular terms. Evaluators are expected to work on the [NodeId] instead.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VirtualNode {
    id: NodeId,
    term: Term,
}

impl VirtualNode {
    /// Creates a new [VirtualNode].
    pub fn new(id: NodeId, term: impl Into<Term>) -> Self {
        Self {
            id,
            term: term.into(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the materialized term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn into_term(self) -> Term {
        self.term
    }
}

impl Display for VirtualNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.term, self.id)
    }
}
