use rdf_rewrite_model::{BlankNode, Literal, NamedNode, Term, TermRef, Variable, VirtualNode};
use std::fmt::{Display, Formatter};

/// A single position (subject, predicate, or object) of a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternItem {
    /// A bound term.
    Term(Term),
    /// A bound term that has been replaced by its storage id.
    Virtual(VirtualNode),
    /// A named variable.
    Variable(Variable),
    /// A blank node that acts as a variable which is scoped to its basic graph pattern.
    BlankVariable(BlankNode),
}

impl PatternItem {
    /// Returns the named variable of this item.
    pub fn variable(&self) -> Option<&Variable> {
        match self {
            PatternItem::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Returns the bound term of this item, if any.
    pub fn term(&self) -> Option<TermRef<'_>> {
        match self {
            PatternItem::Term(term) => Some(term.as_ref()),
            PatternItem::Virtual(node) => Some(node.term().as_ref()),
            PatternItem::Variable(_) | PatternItem::BlankVariable(_) => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, PatternItem::Term(_) | PatternItem::Virtual(_))
    }

    pub fn is_blank_variable(&self) -> bool {
        matches!(self, PatternItem::BlankVariable(_))
    }

    /// Returns true if this item refers to the variable `variable`.
    pub fn is_variable(&self, variable: &Variable) -> bool {
        self.variable() == Some(variable)
    }
}

impl From<Variable> for PatternItem {
    fn from(value: Variable) -> Self {
        PatternItem::Variable(value)
    }
}

impl From<Term> for PatternItem {
    fn from(value: Term) -> Self {
        PatternItem::Term(value)
    }
}

impl From<NamedNode> for PatternItem {
    fn from(value: NamedNode) -> Self {
        PatternItem::Term(value.into())
    }
}

impl From<Literal> for PatternItem {
    fn from(value: Literal) -> Self {
        PatternItem::Term(value.into())
    }
}

impl Display for PatternItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternItem::Term(term) => term.fmt(f),
            PatternItem::Virtual(node) => node.fmt(f),
            PatternItem::Variable(variable) => variable.fmt(f),
            PatternItem::BlankVariable(node) => node.fmt(f),
        }
    }
}
