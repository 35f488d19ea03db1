mod virtual_node;
pub mod vocab;

pub use virtual_node::{NodeId, VirtualNode};

// Re-export some oxrdf types.
pub use oxiri::Iri;
pub use oxrdf::{
    BlankNode, BlankNodeRef, Graph, GraphName, GraphNameRef, IriParseError, Literal, LiteralRef,
    NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Subject, SubjectRef, Term,
    TermParseError, TermRef, Triple, TripleRef, Variable, VariableNameParseError, VariableRef,
};
pub use oxsdatatypes::Integer;

// Re-export the parts of spargebra that the algebra shares with the parser.
pub use spargebra::algebra::{AggregateFunction, Function, PropertyPathExpression};
pub use spargebra::term::NamedNodePattern;
