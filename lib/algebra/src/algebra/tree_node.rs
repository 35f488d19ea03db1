use crate::algebra::Algebra;
use datafusion::common::tree_node::{Transformed, TreeNode, TreeNodeRecursion};
use rdf_rewrite_common::DFResult;
use std::sync::Arc;

/// Integrates the algebra with DataFusion's tree traversal API.
///
/// This provides `transform_up`, `transform_down`, `apply`, `exists`, and friends for algebra
/// trees. Optimisers that treat every node kind the same use these. Optimisers that must decide
/// per node (e.g., only rewriting one side of a join) combine [TreeNode::map_children] with
/// [Algebra::map_lhs] and [Algebra::map_rhs].
impl TreeNode for Algebra {
    fn apply_children<'n, F: FnMut(&'n Self) -> DFResult<TreeNodeRecursion>>(
        &'n self,
        mut f: F,
    ) -> DFResult<TreeNodeRecursion> {
        let mut recursion = TreeNodeRecursion::Continue;
        for child in self.children() {
            recursion = f(child)?;
            if recursion == TreeNodeRecursion::Stop {
                return Ok(TreeNodeRecursion::Stop);
            }
        }
        Ok(recursion)
    }

    fn map_children<F: FnMut(Self) -> DFResult<Transformed<Self>>>(
        self,
        mut f: F,
    ) -> DFResult<Transformed<Self>> {
        Ok(match self {
            leaf @ (Algebra::Bgp { .. }
            | Algebra::LazyBgp { .. }
            | Algebra::AskBgp { .. }
            | Algebra::Null { .. }
            | Algebra::Values { .. }
            | Algebra::SubQuery { .. }
            | Algebra::PropertyPath(_)) => Transformed::no(leaf),
            Algebra::Service {
                name,
                inner,
                silent,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::Service {
                name,
                inner,
                silent,
            }),
            Algebra::Filter { inner, expression } => {
                map_child(inner, &mut f)?.update_data(|inner| Algebra::Filter { inner, expression })
            }
            Algebra::IdentityFilter {
                inner,
                variable,
                term,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::IdentityFilter {
                inner,
                variable,
                term,
            }),
            Algebra::SameTermFilter {
                inner,
                variable,
                term,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::SameTermFilter {
                inner,
                variable,
                term,
            }),
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::Extend {
                inner,
                variable,
                expression,
            }),
            Algebra::Select {
                inner,
                variables,
                select_all,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::Select {
                inner,
                variables,
                select_all,
            }),
            Algebra::Distinct { inner } => {
                map_child(inner, &mut f)?.update_data(|inner| Algebra::Distinct { inner })
            }
            Algebra::Reduced { inner } => {
                map_child(inner, &mut f)?.update_data(|inner| Algebra::Reduced { inner })
            }
            Algebra::OrderBy { inner, ordering } => {
                map_child(inner, &mut f)?.update_data(|inner| Algebra::OrderBy { inner, ordering })
            }
            Algebra::Slice {
                inner,
                limit,
                offset,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::Slice {
                inner,
                limit,
                offset,
            }),
            Algebra::Graph { inner, name } => {
                map_child(inner, &mut f)?.update_data(|inner| Algebra::Graph { inner, name })
            }
            Algebra::PropertyFunction { inner, function } => map_child(inner, &mut f)?
                .update_data(|inner| Algebra::PropertyFunction { inner, function }),
            Algebra::Group {
                inner,
                variables,
                aggregates,
            } => map_child(inner, &mut f)?.update_data(|inner| Algebra::Group {
                inner,
                variables,
                aggregates,
            }),
            Algebra::Having { inner, expression } => {
                map_child(inner, &mut f)?.update_data(|inner| Algebra::Having { inner, expression })
            }
            Algebra::Join { lhs, rhs } => {
                map_pair(lhs, rhs, &mut f)?.update_data(|(lhs, rhs)| Algebra::Join { lhs, rhs })
            }
            Algebra::LeftJoin { lhs, rhs, filter } => map_pair(lhs, rhs, &mut f)?
                .update_data(|(lhs, rhs)| Algebra::LeftJoin { lhs, rhs, filter }),
            Algebra::Union { lhs, rhs } => {
                map_pair(lhs, rhs, &mut f)?.update_data(|(lhs, rhs)| Algebra::Union { lhs, rhs })
            }
            Algebra::Minus { lhs, rhs } => {
                map_pair(lhs, rhs, &mut f)?.update_data(|(lhs, rhs)| Algebra::Minus { lhs, rhs })
            }
            Algebra::ParallelJoin { lhs, rhs } => map_pair(lhs, rhs, &mut f)?
                .update_data(|(lhs, rhs)| Algebra::ParallelJoin { lhs, rhs }),
            Algebra::ParallelUnion { lhs, rhs } => map_pair(lhs, rhs, &mut f)?
                .update_data(|(lhs, rhs)| Algebra::ParallelUnion { lhs, rhs }),
            Algebra::LazyUnion {
                lhs,
                rhs,
                required_results,
            } => map_pair(lhs, rhs, &mut f)?.update_data(|(lhs, rhs)| Algebra::LazyUnion {
                lhs,
                rhs,
                required_results,
            }),
            Algebra::AskUnion { lhs, rhs } => map_pair(lhs, rhs, &mut f)?
                .update_data(|(lhs, rhs)| Algebra::AskUnion { lhs, rhs }),
            Algebra::FilteredProduct {
                lhs,
                rhs,
                expression,
            } => map_pair(lhs, rhs, &mut f)?.update_data(|(lhs, rhs)| {
                Algebra::FilteredProduct {
                    lhs,
                    rhs,
                    expression,
                }
            }),
        })
    }
}

impl Algebra {
    /// Transforms the left-hand side of a binary node. Other nodes are returned unchanged.
    pub fn map_lhs<F: FnOnce(Self) -> DFResult<Transformed<Self>>>(
        self,
        f: F,
    ) -> DFResult<Transformed<Self>> {
        self.map_side(f, true)
    }

    /// Transforms the right-hand side of a binary node. Other nodes are returned unchanged.
    pub fn map_rhs<F: FnOnce(Self) -> DFResult<Transformed<Self>>>(
        self,
        f: F,
    ) -> DFResult<Transformed<Self>> {
        self.map_side(f, false)
    }

    fn map_side<F: FnOnce(Self) -> DFResult<Transformed<Self>>>(
        self,
        f: F,
        lhs_side: bool,
    ) -> DFResult<Transformed<Self>> {
        if self.children().len() != 2 {
            return Ok(Transformed::no(self));
        }

        let mut f = Some(f);
        let mut is_lhs = true;
        self.map_children(|child| {
            let current_is_lhs = std::mem::replace(&mut is_lhs, false);
            match f.take() {
                Some(transform) if current_is_lhs == lhs_side => transform(child),
                other => {
                    f = other;
                    Ok(Transformed::no(child))
                }
            }
        })
    }
}

fn map_child<F: FnMut(Algebra) -> DFResult<Transformed<Algebra>>>(
    child: Arc<Algebra>,
    f: &mut F,
) -> DFResult<Transformed<Arc<Algebra>>> {
    Ok(f(Arc::unwrap_or_clone(child))?.update_data(Arc::new))
}

fn map_pair<F: FnMut(Algebra) -> DFResult<Transformed<Algebra>>>(
    lhs: Arc<Algebra>,
    rhs: Arc<Algebra>,
    f: &mut F,
) -> DFResult<Transformed<(Arc<Algebra>, Arc<Algebra>)>> {
    map_child(lhs, f)?
        .update_data(|lhs| (lhs, rhs))
        .transform_sibling(|(lhs, rhs)| {
            Ok(map_child(rhs, f)?.update_data(|rhs| (lhs, rhs)))
        })
}
