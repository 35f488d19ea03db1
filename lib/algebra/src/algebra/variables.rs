use crate::algebra::{push_unique, Algebra};
use rdf_rewrite_model::{NamedNodePattern, Variable};

impl Algebra {
    /// Returns the variables that may be bound by the solutions of this node, in the order of
    /// their first occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        match self {
            Algebra::Bgp { patterns }
            | Algebra::LazyBgp { patterns, .. }
            | Algebra::AskBgp { patterns } => {
                for pattern in patterns {
                    push_unique(&mut result, pattern.variables());
                }
            }
            Algebra::Null { variables } | Algebra::Values { variables, .. } => {
                push_unique(&mut result, variables.iter().cloned());
            }
            Algebra::SubQuery { query } => push_unique(&mut result, query.projected_variables()),
            Algebra::Service { name, inner, .. } | Algebra::Graph { inner, name } => {
                push_unique(&mut result, graph_variable(name));
                push_unique(&mut result, inner.variables());
            }
            Algebra::PropertyPath(pattern) => {
                push_unique(&mut result, pattern.variables().cloned());
            }
            Algebra::Filter { inner, .. }
            | Algebra::IdentityFilter { inner, .. }
            | Algebra::SameTermFilter { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Reduced { inner }
            | Algebra::OrderBy { inner, .. }
            | Algebra::Slice { inner, .. }
            | Algebra::Having { inner, .. } => push_unique(&mut result, inner.variables()),
            Algebra::Extend {
                inner, variable, ..
            } => {
                push_unique(&mut result, inner.variables());
                push_unique(&mut result, [variable.clone()]);
            }
            Algebra::Select { variables, .. } => push_unique(&mut result, variables.iter().cloned()),
            Algebra::PropertyFunction { inner, function } => {
                push_unique(&mut result, inner.variables());
                push_unique(&mut result, function.variables().cloned());
            }
            Algebra::Group {
                variables,
                aggregates,
                ..
            } => {
                push_unique(&mut result, variables.iter().cloned());
                push_unique(
                    &mut result,
                    aggregates.iter().map(|(variable, _)| variable.clone()),
                );
            }
            Algebra::Minus { lhs, .. } => push_unique(&mut result, lhs.variables()),
            Algebra::Join { lhs, rhs }
            | Algebra::LeftJoin { lhs, rhs, .. }
            | Algebra::Union { lhs, rhs }
            | Algebra::ParallelJoin { lhs, rhs }
            | Algebra::ParallelUnion { lhs, rhs }
            | Algebra::LazyUnion { lhs, rhs, .. }
            | Algebra::AskUnion { lhs, rhs }
            | Algebra::FilteredProduct { lhs, rhs, .. } => {
                push_unique(&mut result, lhs.variables());
                push_unique(&mut result, rhs.variables());
            }
        }
        result
    }

    /// Returns the variables that are bound in every solution of this node.
    ///
    /// This is a subset of [Self::variables]. Rewrites that replace a variable by a term or another
    /// variable use it to make sure that the variable cannot be unbound.
    pub fn fixed_variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        match self {
            Algebra::Bgp { patterns }
            | Algebra::LazyBgp { patterns, .. }
            | Algebra::AskBgp { patterns } => {
                for pattern in patterns {
                    push_unique(&mut result, pattern.fixed_variables());
                }
            }
            Algebra::Null { variables } => push_unique(&mut result, variables.iter().cloned()),
            Algebra::Values {
                variables,
                bindings,
            } => {
                let fixed = variables.iter().enumerate().filter(|(index, _)| {
                    bindings
                        .iter()
                        .all(|row| row.get(*index).is_some_and(Option::is_some))
                });
                push_unique(&mut result, fixed.map(|(_, variable)| variable.clone()));
            }
            Algebra::SubQuery { .. } => {}
            Algebra::PropertyPath(pattern) => {
                push_unique(&mut result, pattern.variables().cloned());
            }
            Algebra::Graph { inner, name } => {
                push_unique(&mut result, graph_variable(name));
                push_unique(&mut result, inner.fixed_variables());
            }
            Algebra::Service { inner, .. }
            | Algebra::Filter { inner, .. }
            | Algebra::IdentityFilter { inner, .. }
            | Algebra::SameTermFilter { inner, .. }
            | Algebra::Extend { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Reduced { inner }
            | Algebra::OrderBy { inner, .. }
            | Algebra::Slice { inner, .. }
            | Algebra::PropertyFunction { inner, .. }
            | Algebra::Having { inner, .. } => push_unique(&mut result, inner.fixed_variables()),
            Algebra::Select {
                inner, variables, ..
            }
            | Algebra::Group {
                inner, variables, ..
            } => {
                let fixed = inner.fixed_variables();
                push_unique(
                    &mut result,
                    variables
                        .iter()
                        .filter(|variable| fixed.contains(variable))
                        .cloned(),
                );
            }
            Algebra::LeftJoin { lhs, .. } | Algebra::Minus { lhs, .. } => {
                push_unique(&mut result, lhs.fixed_variables());
            }
            Algebra::Join { lhs, rhs }
            | Algebra::ParallelJoin { lhs, rhs }
            | Algebra::FilteredProduct { lhs, rhs, .. } => {
                push_unique(&mut result, lhs.fixed_variables());
                push_unique(&mut result, rhs.fixed_variables());
            }
            Algebra::Union { lhs, rhs }
            | Algebra::ParallelUnion { lhs, rhs }
            | Algebra::LazyUnion { lhs, rhs, .. }
            | Algebra::AskUnion { lhs, rhs } => {
                let rhs = rhs.fixed_variables();
                push_unique(
                    &mut result,
                    lhs.fixed_variables()
                        .into_iter()
                        .filter(|variable| rhs.contains(variable)),
                );
            }
        }
        result
    }
}

fn graph_variable(name: &NamedNodePattern) -> Option<Variable> {
    match name {
        NamedNodePattern::Variable(variable) => Some(variable.clone()),
        NamedNodePattern::NamedNode(_) => None,
    }
}
