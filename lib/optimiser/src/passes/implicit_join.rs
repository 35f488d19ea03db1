use crate::product::filtered_product;
use crate::{AlgebraOptimiser, OptimisationTarget, VariableSubstitutionTransformer};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::expr::Expression;
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;
use rdf_rewrite_model::Variable;
use std::sync::Arc;
use tracing::debug;

/// Rewrites filters of the form `?x = ?y` or `sameTerm(?x, ?y)` into joins.
///
/// If both variables are bound in every solution of the filtered algebra, one variable is
/// substituted with the other and re-bound afterward. This turns the comparison into a join on
/// the shared variable. If the substitution is not possible, the filter is turned into an
/// [Algebra::FilteredProduct] if the filtered algebra is a product of variable-disjoint parts.
///
/// `=` compares literals by value while the substitution requires identical terms. Therefore,
/// `=` is only substituted into object positions if unsafe optimisations are enabled.
#[derive(Debug)]
pub struct ImplicitJoinOptimiser {
    unsafe_optimisation: bool,
}

impl ImplicitJoinOptimiser {
    pub fn new(unsafe_optimisation: bool) -> Self {
        Self {
            unsafe_optimisation,
        }
    }

    fn optimise_internal(&self, algebra: Algebra) -> DFResult<Transformed<Algebra>> {
        match algebra {
            Algebra::Filter { inner, expression } => match join_comparison(&expression) {
                Some((lhs, rhs, same_term))
                    if inner.variables().contains(&lhs) && inner.variables().contains(&rhs) =>
                {
                    self.rewrite_implicit_join(inner, expression, lhs, rhs, same_term)
                }
                _ => Algebra::Filter { inner, expression }
                    .map_children(|child| self.optimise_internal(child)),
            },
            algebra => algebra.map_children(|child| self.optimise_internal(child)),
        }
    }

    fn rewrite_implicit_join(
        &self,
        inner: Arc<Algebra>,
        expression: Expression,
        lhs: Variable,
        rhs: Variable,
        same_term: bool,
    ) -> DFResult<Transformed<Algebra>> {
        // An explicit join of unrelated parts is kept as a product such that both parts can be
        // evaluated independently.
        if matches!(inner.as_ref(), Algebra::Join { .. }) {
            if let Ok(product) = filtered_product(&inner, &expression) {
                return self.optimise_product(product);
            }
        }

        let fixed = inner.fixed_variables();
        if fixed.contains(&lhs) && fixed.contains(&rhs) {
            let can_replace_objects = same_term || self.unsafe_optimisation;
            for (find, replacement) in [(&rhs, &lhs), (&lhs, &rhs)] {
                let transformer =
                    VariableSubstitutionTransformer::with_variable(find.clone(), replacement.clone())
                        .with_can_replace_objects(can_replace_objects);
                match transformer.transform_algebra(inner.as_ref().clone()) {
                    Ok(substituted) => {
                        let substituted = self.optimise_internal(substituted)?.data;
                        return Ok(Transformed::yes(Algebra::extend(
                            substituted,
                            find.clone(),
                            Expression::Variable(replacement.clone()),
                        )));
                    }
                    Err(error) => debug!(%error, %find, %replacement, "Substitution not possible"),
                }
            }
        }

        match filtered_product(&inner, &expression) {
            Ok(product) => self.optimise_product(product),
            Err(_) => Algebra::Filter { inner, expression }
                .map_children(|child| self.optimise_internal(child)),
        }
    }

    fn optimise_product(&self, product: Algebra) -> DFResult<Transformed<Algebra>> {
        let product = product.map_children(|child| self.optimise_internal(child))?;
        Ok(Transformed::yes(product.data))
    }
}

impl Default for ImplicitJoinOptimiser {
    fn default() -> Self {
        Self::new(false)
    }
}

impl AlgebraOptimiser for ImplicitJoinOptimiser {
    fn name(&self) -> &str {
        "implicit_join"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        self.optimise_internal(algebra)
    }
}

/// Matches `?x = ?y` and `sameTerm(?x, ?y)` for two distinct variables.
fn join_comparison(expression: &Expression) -> Option<(Variable, Variable, bool)> {
    let (lhs, rhs, same_term) = match expression {
        Expression::Equal(lhs, rhs) => (lhs, rhs, false),
        Expression::SameTerm(lhs, rhs) => (lhs, rhs, true),
        _ => return None,
    };
    let lhs = lhs.as_variable()?;
    let rhs = rhs.as_variable()?;
    (lhs != rhs).then(|| (lhs.clone(), rhs.clone(), same_term))
}
