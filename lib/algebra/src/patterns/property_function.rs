use crate::patterns::{MatchPattern, PatternItem};
use itertools::Itertools;
use rdf_rewrite_model::{NamedNode, Variable};
use std::fmt::{Display, Formatter};

/// A property function that has been recognized within a basic graph pattern.
///
/// Property functions look like regular triple patterns but are computed by a function. Both sides
/// of the function may be a list of arguments (encoded as an RDF collection in the query). The
/// pattern keeps the triple patterns it was extracted from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyFunctionPattern {
    function: NamedNode,
    subject_args: Vec<PatternItem>,
    object_args: Vec<PatternItem>,
    extracted_patterns: Vec<MatchPattern>,
}

impl PropertyFunctionPattern {
    /// Creates a new [PropertyFunctionPattern].
    pub fn new(
        function: NamedNode,
        subject_args: Vec<PatternItem>,
        object_args: Vec<PatternItem>,
        extracted_patterns: Vec<MatchPattern>,
    ) -> Self {
        Self {
            function,
            subject_args,
            object_args,
            extracted_patterns,
        }
    }

    pub fn function(&self) -> &NamedNode {
        &self.function
    }

    pub fn subject_args(&self) -> &[PatternItem] {
        &self.subject_args
    }

    pub fn object_args(&self) -> &[PatternItem] {
        &self.object_args
    }

    /// The triple patterns from which this property function has been extracted.
    pub fn extracted_patterns(&self) -> &[MatchPattern] {
        &self.extracted_patterns
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.subject_args
            .iter()
            .chain(self.object_args.iter())
            .filter_map(PatternItem::variable)
    }

    pub fn has_no_blank_variables(&self) -> bool {
        !self
            .subject_args
            .iter()
            .chain(self.object_args.iter())
            .any(PatternItem::is_blank_variable)
    }
}

impl Display for PropertyFunctionPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({} ; {})",
            self.function,
            self.subject_args.iter().join(" "),
            self.object_args.iter().join(" ")
        )
    }
}
