use crate::reorder::{HeuristicComparer, TriplePatternComparer};
use rdf_rewrite_algebra::patterns::{MatchPattern, PatternItem};
use rdf_rewrite_common::error::StatisticsError;
use rdf_rewrite_model::vocab::opt;
use rdf_rewrite_model::{Graph, Integer, Term, TermRef, Variable};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use tracing::debug;

/// Observed occurrence counts of terms, keyed by the position in which they occur.
///
/// A count for a specific position takes precedence over the position-agnostic `opt:count`.
#[derive(Clone, Debug, Default)]
pub struct Weightings {
    subject_counts: FxHashMap<Term, u64>,
    predicate_counts: FxHashMap<Term, u64>,
    object_counts: FxHashMap<Term, u64>,
    counts: FxHashMap<Term, u64>,
}

impl Weightings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the statistics from a graph that uses the `opt:` vocabulary.
    ///
    /// Triples with other predicates are ignored. Statistics whose object is not a non-negative
    /// integer literal are rejected.
    pub fn from_graph(graph: &Graph) -> Result<Self, StatisticsError> {
        let mut weightings = Self::new();
        for triple in graph.iter() {
            let counts = match triple.predicate {
                p if p == opt::SUBJECT_COUNT => &mut weightings.subject_counts,
                p if p == opt::PREDICATE_COUNT => &mut weightings.predicate_counts,
                p if p == opt::OBJECT_COUNT => &mut weightings.object_counts,
                p if p == opt::COUNT => &mut weightings.counts,
                _ => continue,
            };

            let subject = TermRef::from(triple.subject).into_owned();
            let predicate = triple.predicate.into_owned();
            let TermRef::Literal(literal) = triple.object else {
                return Err(StatisticsError::NotALiteral {
                    subject,
                    predicate,
                    object: triple.object.into_owned(),
                });
            };

            let count = literal
                .value()
                .parse::<Integer>()
                .ok()
                .and_then(|count| u64::try_from(i64::from(count)).ok())
                .ok_or_else(|| StatisticsError::InvalidCount {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    value: literal.into_owned(),
                })?;
            counts.insert(subject, count);
        }

        debug!(
            subjects = weightings.subject_counts.len(),
            predicates = weightings.predicate_counts.len(),
            objects = weightings.object_counts.len(),
            any_position = weightings.counts.len(),
            "Loaded pattern weightings"
        );
        Ok(weightings)
    }

    #[must_use]
    pub fn with_subject_count(mut self, term: impl Into<Term>, count: u64) -> Self {
        self.subject_counts.insert(term.into(), count);
        self
    }

    #[must_use]
    pub fn with_predicate_count(mut self, term: impl Into<Term>, count: u64) -> Self {
        self.predicate_counts.insert(term.into(), count);
        self
    }

    #[must_use]
    pub fn with_object_count(mut self, term: impl Into<Term>, count: u64) -> Self {
        self.object_counts.insert(term.into(), count);
        self
    }

    #[must_use]
    pub fn with_count(mut self, term: impl Into<Term>, count: u64) -> Self {
        self.counts.insert(term.into(), count);
        self
    }

    pub fn subject_count(&self, term: TermRef<'_>) -> Option<u64> {
        self.lookup(&self.subject_counts, term)
    }

    pub fn predicate_count(&self, term: TermRef<'_>) -> Option<u64> {
        self.lookup(&self.predicate_counts, term)
    }

    pub fn object_count(&self, term: TermRef<'_>) -> Option<u64> {
        self.lookup(&self.object_counts, term)
    }

    pub fn is_empty(&self) -> bool {
        self.subject_counts.is_empty()
            && self.predicate_counts.is_empty()
            && self.object_counts.is_empty()
            && self.counts.is_empty()
    }

    fn lookup(&self, counts: &FxHashMap<Term, u64>, term: TermRef<'_>) -> Option<u64> {
        let term = term.into_owned();
        counts
            .get(&term)
            .or_else(|| self.counts.get(&term))
            .copied()
    }
}

/// Orders triple patterns by the product of the weights of their positions.
///
/// The weight of a bound term that occurs `n` times in its position is `1 - 1/max(1, n)`. Bound
/// terms and bound variables without statistics use the default weight of their position.
/// Unbound variables weigh `1.0`.
#[derive(Clone, Debug)]
pub struct WeightingComparer {
    weightings: Weightings,
    default_subject_weight: f64,
    default_predicate_weight: f64,
    default_object_weight: f64,
    variable_weight: f64,
}

impl WeightingComparer {
    pub fn new(weightings: Weightings) -> Self {
        Self {
            weightings,
            default_subject_weight: 0.8,
            default_predicate_weight: 0.4,
            default_object_weight: 0.6,
            variable_weight: 1.0,
        }
    }

    /// Overrides the weights of bound terms for which no statistics exist.
    #[must_use]
    pub fn with_default_weights(mut self, subject: f64, predicate: f64, object: f64) -> Self {
        self.default_subject_weight = subject;
        self.default_predicate_weight = predicate;
        self.default_object_weight = object;
        self
    }

    pub fn weightings(&self) -> &Weightings {
        &self.weightings
    }

    /// Computes the selectivity of `pattern`. Lower values are more selective.
    ///
    /// Variables in `bound` are bound to a term that is not known yet and weigh like a bound term
    /// without statistics.
    pub fn selectivity(&self, pattern: &MatchPattern, bound: &FxHashSet<Variable>) -> f64 {
        let subject = self.weight(
            &pattern.subject,
            bound,
            |term| self.weightings.subject_count(term),
            self.default_subject_weight,
        );
        let predicate = self.weight(
            &pattern.predicate,
            bound,
            |term| self.weightings.predicate_count(term),
            self.default_predicate_weight,
        );
        let object = self.weight(
            &pattern.object,
            bound,
            |term| self.weightings.object_count(term),
            self.default_object_weight,
        );
        subject * predicate * object
    }

    fn weight(
        &self,
        item: &PatternItem,
        bound: &FxHashSet<Variable>,
        count: impl Fn(TermRef<'_>) -> Option<u64>,
        default_weight: f64,
    ) -> f64 {
        match (item.term(), item.variable()) {
            (Some(term), _) => count(term).map_or(default_weight, weight_of_count),
            (None, Some(variable)) if bound.contains(variable) => default_weight,
            (None, _) => self.variable_weight,
        }
    }
}

impl TriplePatternComparer for WeightingComparer {
    fn compare(
        &self,
        lhs: &MatchPattern,
        rhs: &MatchPattern,
        bound: &FxHashSet<Variable>,
    ) -> Ordering {
        self.selectivity(lhs, bound)
            .total_cmp(&self.selectivity(rhs, bound))
            .then_with(|| HeuristicComparer.compare(lhs, rhs, bound))
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Weights are estimates and do not need the full precision of large counts"
)]
fn weight_of_count(count: u64) -> f64 {
    1.0 - 1.0 / count.max(1) as f64
}
