use rdf_rewrite_algebra::patterns::MatchPattern;
use rdf_rewrite_model::{NamedNode, Variable};

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

pub fn triple(subject: &str, predicate: &str, object: &str) -> MatchPattern {
    MatchPattern::new(var(subject), iri(predicate), var(object))
}
