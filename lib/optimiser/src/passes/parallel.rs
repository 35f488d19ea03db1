use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::{are_disjoint, Algebra};
use rdf_rewrite_common::DFResult;

/// Marks joins and unions whose sides share no variables as candidates for concurrent evaluation.
///
/// This optimiser is not part of the default pipeline.
#[derive(Debug)]
pub struct ParallelEvaluationOptimiser;

impl ParallelEvaluationOptimiser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParallelEvaluationOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for ParallelEvaluationOptimiser {
    fn name(&self) -> &str {
        "parallel_evaluation"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        algebra.transform_up(|node| {
            Ok(match node {
                Algebra::Join { lhs, rhs } if are_disjoint(&lhs, &rhs) => {
                    Transformed::yes(Algebra::ParallelJoin { lhs, rhs })
                }
                Algebra::Union { lhs, rhs } if are_disjoint(&lhs, &rhs) => {
                    Transformed::yes(Algebra::ParallelUnion { lhs, rhs })
                }
                node => Transformed::no(node),
            })
        })
    }
}
