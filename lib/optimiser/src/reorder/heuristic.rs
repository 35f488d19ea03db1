use crate::reorder::{is_bound_item, TriplePatternComparer};
use rdf_rewrite_algebra::patterns::MatchPattern;
use rdf_rewrite_model::Variable;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Orders triple patterns by their estimated cardinality.
///
/// The estimate only considers which positions of a pattern are bound, either by a term or by a
/// variable that is already bound. Ties keep the written order.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicComparer;

impl TriplePatternComparer for HeuristicComparer {
    fn compare(
        &self,
        lhs: &MatchPattern,
        rhs: &MatchPattern,
        bound: &FxHashSet<Variable>,
    ) -> Ordering {
        estimate_pattern_cardinality(lhs, bound).cmp(&estimate_pattern_cardinality(rhs, bound))
    }
}

/// Estimates the number of solutions of a triple pattern from its bound positions.
///
/// A bound subject is the most selective position, followed by a bound object. Bound predicates
/// barely restrict the result as there are usually few distinct predicates in a graph.
pub fn estimate_pattern_cardinality(pattern: &MatchPattern, bound: &FxHashSet<Variable>) -> u64 {
    match (
        is_bound_item(&pattern.subject, bound),
        is_bound_item(&pattern.predicate, bound),
        is_bound_item(&pattern.object, bound),
    ) {
        (true, true, true) => 1,
        (true, false, true) => 2,
        (true, true, false) => 10,
        (true, false, false) => 100,
        (false, true, true) => 10_000,
        (false, false, true) => 100_000,
        (false, true, false) => 1_000_000,
        (false, false, false) => 1_000_000_000,
    }
}
