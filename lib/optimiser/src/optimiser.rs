use datafusion::common::tree_node::Transformed;
use rdf_rewrite_algebra::{Algebra, Query, UpdateCommandSet};
use rdf_rewrite_common::DFResult;
use std::fmt::Debug;
use tracing::{debug, warn};

/// The query or update whose algebra is optimised.
#[derive(Clone, Copy, Debug)]
pub enum OptimisationTarget<'a> {
    Query(&'a Query),
    Update(&'a UpdateCommandSet),
    /// An algebra without a surrounding query or update.
    Algebra,
}

/// A rewrite rule for algebra trees.
///
/// Optimisers are independent of each other. Each optimiser must produce an algebra that is
/// equivalent to its input and must tolerate any algebra shape that other optimisers produce.
pub trait AlgebraOptimiser: Debug + Send + Sync {
    /// The unique name of this optimiser.
    fn name(&self) -> &str;

    /// Returns true if this optimiser should be applied to the algebra of `query`.
    fn is_applicable(&self, _query: &Query) -> bool {
        true
    }

    /// Returns true if this optimiser should be applied to the algebra of `update`.
    fn is_applicable_to_update(&self, _update: &UpdateCommandSet) -> bool {
        true
    }

    /// Rewrites `algebra`.
    ///
    /// Errors returned by this method are contained by [Self::optimise].
    fn rewrite(
        &self,
        algebra: Algebra,
        target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>>;

    /// Rewrites `algebra` and returns the input unchanged if the rewrite fails.
    fn optimise(&self, algebra: Algebra, target: OptimisationTarget<'_>) -> Algebra {
        match self.rewrite(algebra.clone(), target) {
            Ok(result) => {
                if result.transformed {
                    debug!(optimiser = self.name(), "Optimiser rewrote the algebra");
                }
                result.data
            }
            Err(error) => {
                warn!(
                    optimiser = self.name(),
                    %error,
                    "Optimiser failed, continuing with its input"
                );
                algebra
            }
        }
    }
}
