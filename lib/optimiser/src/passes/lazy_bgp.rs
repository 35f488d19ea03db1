use crate::passes::{is_incrementally_evaluable, join_sides_are_disjoint};
use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::{Algebra, Query, UpdateCommandSet};
use rdf_rewrite_common::DFResult;
use std::sync::Arc;

/// Marks the parts of a query that may stop producing solutions once the `LIMIT` of the query is
/// satisfied.
///
/// This is only possible if no solution modifier of the query needs to see every solution (e.g.,
/// `DISTINCT`, grouping, or an ordering that cannot be satisfied from the first pattern).
#[derive(Debug)]
pub struct LazyBgpOptimiser;

impl LazyBgpOptimiser {
    pub fn new() -> Self {
        Self
    }

    fn optimise_internal(&self, algebra: Algebra, required: usize) -> DFResult<Transformed<Algebra>> {
        Ok(match algebra {
            Algebra::Bgp { patterns } if is_incrementally_evaluable(&patterns) => {
                Transformed::yes(Algebra::LazyBgp {
                    patterns,
                    required_results: Some(required),
                })
            }
            Algebra::Union { lhs, rhs } => {
                let lhs = self.optimise_internal(Arc::unwrap_or_clone(lhs), required)?;
                let rhs = self.optimise_internal(Arc::unwrap_or_clone(rhs), required)?;
                Transformed::yes(Algebra::LazyUnion {
                    lhs: Arc::new(lhs.data),
                    rhs: Arc::new(rhs.data),
                    required_results: Some(required),
                })
            }
            Algebra::Join { lhs, rhs } => {
                let join = Algebra::Join { lhs, rhs };
                if join_sides_are_disjoint(&join) {
                    join.map_children(|child| self.optimise_internal(child, required))?
                } else {
                    join.map_rhs(|rhs| self.optimise_internal(rhs, required))?
                }
            }
            left_join @ Algebra::LeftJoin { .. } => {
                left_join.map_lhs(|lhs| self.optimise_internal(lhs, required))?
            }
            node @ (Algebra::Graph { .. }
            | Algebra::Select { .. }
            | Algebra::Slice { .. }
            | Algebra::OrderBy { .. }) => {
                node.map_children(|child| self.optimise_internal(child, required))?
            }
            node => Transformed::no(node),
        })
    }
}

impl Default for LazyBgpOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for LazyBgpOptimiser {
    fn name(&self) -> &str {
        "lazy_bgp"
    }

    fn is_applicable(&self, query: &Query) -> bool {
        query.limit().is_some_and(|limit| limit > 0)
            && !query.has_distinct_modifier()
            && query.is_optimisable_order_by()
            && !query.is_aggregate()
            && query.having().is_none()
            && query.bindings().is_none()
    }

    fn is_applicable_to_update(&self, _update: &UpdateCommandSet) -> bool {
        false
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        let OptimisationTarget::Query(query) = target else {
            return Ok(Transformed::no(algebra));
        };
        let Some(limit) = query.limit() else {
            return Ok(Transformed::no(algebra));
        };

        self.optimise_internal(algebra, limit.saturating_add(query.offset()))
    }
}
