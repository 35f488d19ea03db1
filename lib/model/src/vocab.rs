//! Vocabularies used by the optimiser.

pub use oxrdf::vocab::{rdf, xsd};

/// The vocabulary of statistics graphs that drive the weighted pattern reordering.
pub mod opt {
    use oxrdf::NamedNodeRef;

    /// The namespace of the statistics vocabulary.
    pub const NAMESPACE: &str = "http://rdf-rewrite.org/ns/optimiserStats#";

    /// The number of times the subject of the statement occurs in any position.
    pub const COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdf-rewrite.org/ns/optimiserStats#count");
    /// The number of times the subject of the statement occurs in subject position.
    pub const SUBJECT_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdf-rewrite.org/ns/optimiserStats#subjectCount");
    /// The number of times the subject of the statement occurs in predicate position.
    pub const PREDICATE_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdf-rewrite.org/ns/optimiserStats#predicateCount");
    /// The number of times the subject of the statement occurs in object position.
    pub const OBJECT_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdf-rewrite.org/ns/optimiserStats#objectCount");
}
