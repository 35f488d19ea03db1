use crate::product::filtered_product;
use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;

/// Rewrites filters over products of variable-disjoint parts into [Algebra::FilteredProduct].
///
/// Evaluators can then apply the filter while building the product instead of materializing the
/// full product first.
#[derive(Debug)]
pub struct FilteredProductOptimiser;

impl FilteredProductOptimiser {
    pub fn new() -> Self {
        Self
    }

    fn optimise_internal(&self, algebra: Algebra) -> DFResult<Transformed<Algebra>> {
        match algebra {
            Algebra::Filter { inner, expression } => match filtered_product(&inner, &expression) {
                Ok(product) => Ok(Transformed::yes(
                    product
                        .map_children(|child| self.optimise_internal(child))?
                        .data,
                )),
                Err(_) => Algebra::Filter { inner, expression }
                    .map_children(|child| self.optimise_internal(child)),
            },
            algebra => algebra.map_children(|child| self.optimise_internal(child)),
        }
    }
}

impl Default for FilteredProductOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for FilteredProductOptimiser {
    fn name(&self) -> &str {
        "filtered_product"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        self.optimise_internal(algebra)
    }
}
