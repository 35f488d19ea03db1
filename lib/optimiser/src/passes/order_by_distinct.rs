use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::expr::OrderExpression;
use rdf_rewrite_algebra::{Algebra, Query, UpdateCommandSet};
use rdf_rewrite_common::DFResult;
use rdf_rewrite_model::Variable;
use std::sync::Arc;

/// Moves an ordering above a `DISTINCT` or `REDUCED` if the ordering only uses projected
/// variables.
///
/// Removing duplicates before sorting reduces the number of solutions that must be sorted.
#[derive(Debug)]
pub struct OrderByDistinctOptimiser;

impl OrderByDistinctOptimiser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrderByDistinctOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for OrderByDistinctOptimiser {
    fn name(&self) -> &str {
        "order_by_distinct"
    }

    fn is_applicable(&self, query: &Query) -> bool {
        query.has_distinct_modifier() && query.order_by().is_some() && !query.is_select_all()
    }

    fn is_applicable_to_update(&self, _update: &UpdateCommandSet) -> bool {
        false
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        algebra.transform_up(|node| Ok(pull_up_ordering(node)))
    }
}

fn pull_up_ordering(algebra: Algebra) -> Transformed<Algebra> {
    let (inner, distinct) = match algebra {
        Algebra::Distinct { inner } => (inner, true),
        Algebra::Reduced { inner } => (inner, false),
        algebra => return Transformed::no(algebra),
    };

    let rewritten = match inner.as_ref() {
        Algebra::Select {
            inner: select_inner,
            variables,
            select_all: false,
        } => match select_inner.as_ref() {
            Algebra::OrderBy {
                inner: order_inner,
                ordering,
            } if orders_by_projected_variables(ordering, variables) => {
                let select = Algebra::Select {
                    inner: Arc::clone(order_inner),
                    variables: variables.clone(),
                    select_all: false,
                };
                let deduplicated = if distinct {
                    Algebra::distinct(select)
                } else {
                    Algebra::reduced(select)
                };
                Some(Algebra::order_by(deduplicated, ordering.clone()))
            }
            _ => None,
        },
        _ => None,
    };

    match rewritten {
        Some(rewritten) => Transformed::yes(rewritten),
        None if distinct => Transformed::no(Algebra::Distinct { inner }),
        None => Transformed::no(Algebra::Reduced { inner }),
    }
}

fn orders_by_projected_variables(ordering: &[OrderExpression], projected: &[Variable]) -> bool {
    ordering.iter().all(|ordering| {
        ordering
            .expression()
            .variables()
            .iter()
            .all(|variable| projected.contains(variable))
    })
}
