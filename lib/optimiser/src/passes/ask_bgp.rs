use crate::passes::{is_incrementally_evaluable, join_sides_are_disjoint};
use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::{Algebra, Query, QueryType, UpdateCommandSet};
use rdf_rewrite_common::DFResult;
use std::sync::Arc;

/// Marks the parts of an `ASK` query that may stop after the first solution.
#[derive(Debug)]
pub struct AskBgpOptimiser;

impl AskBgpOptimiser {
    pub fn new() -> Self {
        Self
    }

    fn optimise_internal(&self, algebra: Algebra) -> DFResult<Transformed<Algebra>> {
        Ok(match algebra {
            Algebra::Bgp { patterns } if is_incrementally_evaluable(&patterns) => {
                Transformed::yes(Algebra::AskBgp { patterns })
            }
            Algebra::Union { lhs, rhs } => {
                let lhs = self.optimise_internal(Arc::unwrap_or_clone(lhs))?;
                let rhs = self.optimise_internal(Arc::unwrap_or_clone(rhs))?;
                Transformed::yes(Algebra::AskUnion {
                    lhs: Arc::new(lhs.data),
                    rhs: Arc::new(rhs.data),
                })
            }
            join @ Algebra::Join { .. } => {
                if join_sides_are_disjoint(&join) {
                    join.map_children(|child| self.optimise_internal(child))?
                } else {
                    join.map_rhs(|rhs| self.optimise_internal(rhs))?
                }
            }
            left_join @ Algebra::LeftJoin { .. } => {
                left_join.map_lhs(|lhs| self.optimise_internal(lhs))?
            }
            node @ (Algebra::Graph { .. }
            | Algebra::Select { .. }
            | Algebra::Extend { .. }
            | Algebra::Distinct { .. }
            | Algebra::Reduced { .. }) => {
                node.map_children(|child| self.optimise_internal(child))?
            }
            node => Transformed::no(node),
        })
    }
}

impl Default for AskBgpOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for AskBgpOptimiser {
    fn name(&self) -> &str {
        "ask_bgp"
    }

    fn is_applicable(&self, query: &Query) -> bool {
        query.query_type() == QueryType::Ask && !query.has_solution_modifiers()
    }

    fn is_applicable_to_update(&self, _update: &UpdateCommandSet) -> bool {
        false
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        self.optimise_internal(algebra)
    }
}
