use rdf_rewrite_algebra::expr::Expression;
use rdf_rewrite_algebra::patterns::{has_only_plain_variables, TriplePattern};
use rdf_rewrite_algebra::{are_disjoint, Algebra};
use rdf_rewrite_common::error::{RewriteError, RewriteResult};
use rdf_rewrite_model::Variable;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Turns `Filter(inner, expression)` into a [Algebra::FilteredProduct].
///
/// This is possible if `inner` is a product of two variable-disjoint parts and `expression`
/// references variables from both parts. Otherwise, [RewriteError::NotAProduct] is returned.
pub(crate) fn filtered_product(inner: &Algebra, expression: &Expression) -> RewriteResult<Algebra> {
    match inner {
        Algebra::Bgp { patterns } => {
            let split = find_split_point(patterns, expression).ok_or(RewriteError::NotAProduct)?;
            let (lhs, rhs) = patterns.split_at(split);
            Ok(Algebra::filtered_product(
                Algebra::Bgp {
                    patterns: lhs.to_vec(),
                },
                Algebra::Bgp {
                    patterns: rhs.to_vec(),
                },
                expression.clone(),
            ))
        }
        Algebra::Join { lhs, rhs }
            if are_disjoint(lhs, rhs) && spans(expression, &lhs.variables(), &rhs.variables()) =>
        {
            Ok(Algebra::FilteredProduct {
                lhs: Arc::clone(lhs),
                rhs: Arc::clone(rhs),
                expression: expression.clone(),
            })
        }
        _ => Err(RewriteError::NotAProduct),
    }
}

/// Returns the first index that splits `patterns` into two variable-disjoint parts that are both
/// referenced by `expression`.
///
/// Only basic graph patterns that consist of plain matches can be split.
pub(crate) fn find_split_point(patterns: &[TriplePattern], expression: &Expression) -> Option<usize> {
    if patterns.len() < 2
        || !patterns.iter().all(|pattern| pattern.as_match().is_some())
        || !has_only_plain_variables(patterns)
    {
        return None;
    }

    (1..patterns.len()).find(|split| {
        let (lhs, rhs) = patterns.split_at(*split);
        let lhs = collect_variables(lhs);
        let rhs = collect_variables(rhs);
        lhs.iter().all(|variable| !rhs.contains(variable)) && spans(expression, &lhs, &rhs)
    })
}

fn collect_variables(patterns: &[TriplePattern]) -> Vec<Variable> {
    patterns
        .iter()
        .flat_map(TriplePattern::variables)
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect()
}

fn spans(expression: &Expression, lhs: &[Variable], rhs: &[Variable]) -> bool {
    let variables = expression.variables();
    variables.iter().any(|variable| lhs.contains(variable))
        && variables.iter().any(|variable| rhs.contains(variable))
}
