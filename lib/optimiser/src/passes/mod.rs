//! The algebra optimisers of the pipeline.

mod ask_bgp;
mod filtered_product;
mod identity_filter;
mod implicit_join;
mod lazy_bgp;
mod order_by_distinct;
mod parallel;
mod property_function;
mod strict;
mod virtual_algebra;

pub use ask_bgp::AskBgpOptimiser;
pub use filtered_product::FilteredProductOptimiser;
pub use identity_filter::IdentityFilterOptimiser;
pub use implicit_join::ImplicitJoinOptimiser;
pub use lazy_bgp::LazyBgpOptimiser;
pub use order_by_distinct::OrderByDistinctOptimiser;
pub use parallel::ParallelEvaluationOptimiser;
pub use property_function::{
    PropertyFunctionFactory, PropertyFunctionInfo, PropertyFunctionOptimiser,
};
pub use strict::StrictAlgebraOptimiser;
pub use virtual_algebra::VirtualAlgebraOptimiser;

use rdf_rewrite_algebra::patterns::TriplePattern;
use rdf_rewrite_algebra::{are_disjoint, Algebra};

/// Returns true if a basic graph pattern can be evaluated incrementally.
///
/// Such patterns only consist of matches, filters, and `BIND` assignments.
fn is_incrementally_evaluable(patterns: &[TriplePattern]) -> bool {
    !patterns.is_empty()
        && patterns.iter().all(|pattern| {
            matches!(
                pattern,
                TriplePattern::Match(_)
                    | TriplePattern::Filter(_)
                    | TriplePattern::BindAssignment { .. }
            )
        })
}

/// Returns true if `join` is a binary node whose sides share no variables.
fn join_sides_are_disjoint(join: &Algebra) -> bool {
    match join.children().as_slice() {
        [lhs, rhs] => are_disjoint(lhs, rhs),
        _ => false,
    }
}
