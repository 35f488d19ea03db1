use crate::{AlgebraOptimiser, OptimisationTarget, VariableSubstitutionTransformer};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::expr::Expression;
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;
use rdf_rewrite_model::{Term, TermRef, Variable};
use std::sync::Arc;
use tracing::debug;

/// Rewrites filters of the form `?x = <iri>` or `sameTerm(?x, term)`.
///
/// If `?x` is bound in every solution of the filtered algebra, the variable is replaced with the
/// constant and re-bound afterward. Otherwise, the filter is replaced by an
/// [Algebra::IdentityFilter] or [Algebra::SameTermFilter] that evaluators can execute as a lookup.
#[derive(Debug)]
pub struct IdentityFilterOptimiser;

impl IdentityFilterOptimiser {
    pub fn new() -> Self {
        Self
    }

    fn optimise_internal(&self, algebra: Algebra) -> DFResult<Transformed<Algebra>> {
        match algebra {
            Algebra::Filter { inner, expression } => match identity_comparison(&expression) {
                Some(comparison) => Ok(Transformed::yes(self.rewrite_identity(inner, comparison)?)),
                None => Algebra::Filter { inner, expression }
                    .map_children(|child| self.optimise_internal(child)),
            },
            algebra => algebra.map_children(|child| self.optimise_internal(child)),
        }
    }

    fn rewrite_identity(
        &self,
        inner: Arc<Algebra>,
        comparison: IdentityComparison,
    ) -> DFResult<Algebra> {
        let inner = Arc::unwrap_or_clone(inner);
        let IdentityComparison {
            variable,
            term,
            same_term,
        } = comparison;

        if inner.fixed_variables().contains(&variable) {
            let transformer =
                VariableSubstitutionTransformer::with_term(variable.clone(), term.clone());
            match transformer.transform_algebra(inner.clone()) {
                Ok(substituted) => {
                    let substituted = self.optimise_internal(substituted)?.data;
                    return Ok(Algebra::extend(
                        substituted,
                        variable,
                        Expression::Constant(term),
                    ));
                }
                Err(error) => debug!(%error, %variable, "Keeping identity filter"),
            }
        }

        let inner = Arc::new(self.optimise_internal(inner)?.data);
        let term = Expression::Constant(term);
        Ok(if same_term {
            Algebra::SameTermFilter {
                inner,
                variable,
                term,
            }
        } else {
            Algebra::IdentityFilter {
                inner,
                variable,
                term,
            }
        })
    }
}

impl Default for IdentityFilterOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for IdentityFilterOptimiser {
    fn name(&self) -> &str {
        "identity_filter"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        self.optimise_internal(algebra)
    }
}

struct IdentityComparison {
    variable: Variable,
    term: Term,
    same_term: bool,
}

/// Matches `?x = <iri>`, `<iri> = ?x`, and `sameTerm` with any constant.
///
/// `=` is restricted to IRIs as equal literals may be different terms.
fn identity_comparison(expression: &Expression) -> Option<IdentityComparison> {
    let (lhs, rhs, same_term) = match expression {
        Expression::Equal(lhs, rhs) => (lhs, rhs, false),
        Expression::SameTerm(lhs, rhs) => (lhs, rhs, true),
        _ => return None,
    };

    let (variable, term) = match (lhs.as_variable(), rhs.as_variable()) {
        (Some(variable), None) => (variable, rhs.as_constant()?),
        (None, Some(variable)) => (variable, lhs.as_constant()?),
        _ => return None,
    };

    if !same_term && !matches!(term, TermRef::NamedNode(_)) {
        return None;
    }

    Some(IdentityComparison {
        variable: variable.clone(),
        term: term.into_owned(),
        same_term,
    })
}
