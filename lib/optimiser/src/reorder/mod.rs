//! Ordering of the triple patterns within basic graph patterns.
//!
//! Only contiguous runs of [TriplePattern::Match] patterns are reordered. Filters, assignments,
//! and other patterns keep their position as they may depend on the patterns before them.

mod heuristic;
mod weighting;

use datafusion::common::tree_node::{Transformed, TreeNode, TreeNodeRecursion};
use rdf_rewrite_algebra::patterns::{MatchPattern, PatternItem, TriplePattern};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;
use rdf_rewrite_model::Variable;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

pub use heuristic::{estimate_pattern_cardinality, HeuristicComparer};
pub use weighting::{WeightingComparer, Weightings};

/// Ranks the triple patterns of a basic graph pattern. Patterns that are ranked lower are
/// evaluated first.
pub trait TriplePatternComparer: Debug + Send + Sync {
    /// Compares two patterns. The variables in `bound` are bound before either pattern is
    /// evaluated and restrict their position like a term.
    fn compare(
        &self,
        lhs: &MatchPattern,
        rhs: &MatchPattern,
        bound: &FxHashSet<Variable>,
    ) -> Ordering;

    /// Returns true if the patterns must be evaluated in the order in which they were written.
    fn keeps_written_order(&self) -> bool {
        false
    }
}

/// Keeps the patterns in the order in which they were written.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReorderComparer;

impl TriplePatternComparer for NoReorderComparer {
    fn compare(
        &self,
        _lhs: &MatchPattern,
        _rhs: &MatchPattern,
        _bound: &FxHashSet<Variable>,
    ) -> Ordering {
        Ordering::Equal
    }

    fn keeps_written_order(&self) -> bool {
        true
    }
}

/// Orders the triple patterns of basic graph patterns with a [TriplePatternComparer].
///
/// Patterns are picked one at a time. The next pattern is the lowest ranked pattern among those
/// that share a variable with the patterns picked so far, such that no run starts a cross product
/// while a connected pattern is left. If no remaining pattern is connected, all remaining patterns
/// are candidates. Patterns that the comparer considers equal keep their relative order.
#[derive(Debug, Clone)]
pub struct QueryOptimiser {
    comparer: Arc<dyn TriplePatternComparer>,
}

impl QueryOptimiser {
    pub fn new(comparer: Arc<dyn TriplePatternComparer>) -> Self {
        Self { comparer }
    }

    /// Creates a query optimiser that orders patterns by the number of bound positions.
    pub fn heuristic() -> Self {
        Self::new(Arc::new(HeuristicComparer))
    }

    /// Creates a query optimiser that orders patterns by the given statistics.
    pub fn weighted(weightings: Weightings) -> Self {
        Self::new(Arc::new(WeightingComparer::new(weightings)))
    }

    /// Creates a query optimiser that keeps the order of the patterns.
    pub fn no_reorder() -> Self {
        Self::new(Arc::new(NoReorderComparer))
    }

    pub fn comparer(&self) -> &dyn TriplePatternComparer {
        self.comparer.as_ref()
    }

    /// Orders the contiguous runs of match patterns in `patterns`.
    pub fn optimise(&self, patterns: Vec<TriplePattern>) -> Vec<TriplePattern> {
        self.optimise_with_bound(patterns, &FxHashSet::default())
    }

    /// Orders the contiguous runs of match patterns in `patterns`, given the variables that the
    /// enclosing scope binds before the patterns are evaluated.
    pub fn optimise_with_bound(
        &self,
        patterns: Vec<TriplePattern>,
        bound: &FxHashSet<Variable>,
    ) -> Vec<TriplePattern> {
        let mut bound = bound.clone();
        let mut result = Vec::with_capacity(patterns.len());
        let mut run = Vec::new();
        for pattern in patterns {
            match pattern {
                TriplePattern::Match(pattern) => run.push(pattern),
                pattern => {
                    self.flush_run(&mut run, &mut bound, &mut result);
                    bound.extend(pattern.variables());
                    result.push(pattern);
                }
            }
        }
        self.flush_run(&mut run, &mut bound, &mut result);
        result
    }

    /// Orders the patterns of every basic graph pattern in `algebra`.
    ///
    /// The variables of the left-hand side of a join are considered bound when ordering the
    /// right-hand side.
    pub fn optimise_algebra(&self, algebra: Algebra) -> DFResult<Transformed<Algebra>> {
        self.optimise_scoped(algebra, &FxHashSet::default())
    }

    fn optimise_scoped(
        &self,
        algebra: Algebra,
        bound: &FxHashSet<Variable>,
    ) -> DFResult<Transformed<Algebra>> {
        match algebra {
            Algebra::Bgp { patterns } => {
                let ordered = self.optimise_with_bound(patterns.clone(), bound);
                Ok(if ordered == patterns {
                    Transformed::no(Algebra::Bgp { patterns })
                } else {
                    Transformed::yes(Algebra::Bgp { patterns: ordered })
                })
            }
            Algebra::Join { lhs, rhs } => {
                let (lhs, rhs, transformed) = self.optimise_sides(lhs, rhs, bound)?;
                Ok(Transformed::new(
                    Algebra::Join { lhs, rhs },
                    transformed,
                    TreeNodeRecursion::Continue,
                ))
            }
            Algebra::LeftJoin { lhs, rhs, filter } => {
                let (lhs, rhs, transformed) = self.optimise_sides(lhs, rhs, bound)?;
                Ok(Transformed::new(
                    Algebra::LeftJoin { lhs, rhs, filter },
                    transformed,
                    TreeNodeRecursion::Continue,
                ))
            }
            algebra => algebra.map_children(|child| self.optimise_scoped(child, bound)),
        }
    }

    fn optimise_sides(
        &self,
        lhs: Arc<Algebra>,
        rhs: Arc<Algebra>,
        bound: &FxHashSet<Variable>,
    ) -> DFResult<(Arc<Algebra>, Arc<Algebra>, bool)> {
        let lhs = self.optimise_scoped(Arc::unwrap_or_clone(lhs), bound)?;
        let mut rhs_bound = bound.clone();
        rhs_bound.extend(lhs.data.variables());
        let rhs = self.optimise_scoped(Arc::unwrap_or_clone(rhs), &rhs_bound)?;
        Ok((
            Arc::new(lhs.data),
            Arc::new(rhs.data),
            lhs.transformed || rhs.transformed,
        ))
    }

    fn flush_run(
        &self,
        run: &mut Vec<MatchPattern>,
        bound: &mut FxHashSet<Variable>,
        result: &mut Vec<TriplePattern>,
    ) {
        if self.comparer.keeps_written_order() {
            for pattern in run.drain(..) {
                bound.extend(pattern.variables().cloned());
                result.push(TriplePattern::Match(pattern));
            }
            return;
        }

        while let Some(index) = self.next_pattern(run, bound) {
            let pattern = run.remove(index);
            bound.extend(pattern.variables().cloned());
            result.push(TriplePattern::Match(pattern));
        }
    }

    fn next_pattern(&self, run: &[MatchPattern], bound: &FxHashSet<Variable>) -> Option<usize> {
        let connected = run.iter().any(|pattern| shares_variable(pattern, bound));
        run.iter()
            .enumerate()
            .filter(|(_, pattern)| !connected || shares_variable(pattern, bound))
            .min_by(|(_, lhs), (_, rhs)| self.comparer.compare(lhs, rhs, bound))
            .map(|(index, _)| index)
    }
}

/// Returns true if `item` is a term or a variable in `bound`.
pub(crate) fn is_bound_item(item: &PatternItem, bound: &FxHashSet<Variable>) -> bool {
    item.is_bound() || item.variable().is_some_and(|variable| bound.contains(variable))
}

fn shares_variable(pattern: &MatchPattern, bound: &FxHashSet<Variable>) -> bool {
    pattern.variables().any(|variable| bound.contains(variable))
}

impl Default for QueryOptimiser {
    fn default() -> Self {
        Self::heuristic()
    }
}
