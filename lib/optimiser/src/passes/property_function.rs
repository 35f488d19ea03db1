use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::patterns::{
    MatchPattern, PatternItem, PropertyFunctionPattern, TriplePattern,
};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;
use rdf_rewrite_model::vocab::rdf;
use rdf_rewrite_model::{NamedNode, NamedNodeRef, Term};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Creates property functions from the triple patterns that invoke them.
pub trait PropertyFunctionFactory: Debug + Send + Sync {
    /// Returns true if `function` is a property function created by this factory.
    fn is_property_function(&self, function: &NamedNode) -> bool;

    /// Creates the property function that `info` describes.
    ///
    /// Returns [None] if the arguments are not valid for the function. The patterns are then kept
    /// as regular triple patterns.
    fn try_create(&self, info: &PropertyFunctionInfo) -> Option<PropertyFunctionPattern>;
}

/// A property function invocation that was found in a basic graph pattern.
///
/// The arguments of either side can be given as an RDF collection, e.g.,
/// `?s <fn> (?a ?b)`. The patterns that make up the invocation, including the collection, are
/// available in [Self::patterns].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyFunctionInfo {
    function: NamedNode,
    subject_args: Vec<PatternItem>,
    object_args: Vec<PatternItem>,
    patterns: Vec<MatchPattern>,
}

impl PropertyFunctionInfo {
    pub fn function(&self) -> &NamedNode {
        &self.function
    }

    pub fn subject_args(&self) -> &[PatternItem] {
        &self.subject_args
    }

    pub fn object_args(&self) -> &[PatternItem] {
        &self.object_args
    }

    pub fn patterns(&self) -> &[MatchPattern] {
        &self.patterns
    }

    /// Creates a property function pattern with the arguments of this invocation.
    pub fn to_pattern(&self) -> PropertyFunctionPattern {
        PropertyFunctionPattern::new(
            self.function.clone(),
            self.subject_args.clone(),
            self.object_args.clone(),
            self.patterns.clone(),
        )
    }
}

/// Replaces the triple patterns that invoke a property function with a
/// [TriplePattern::PropertyFunction].
///
/// Without any registered factory, this optimiser does nothing.
#[derive(Debug, Default, Clone)]
pub struct PropertyFunctionOptimiser {
    factories: Vec<Arc<dyn PropertyFunctionFactory>>,
}

impl PropertyFunctionOptimiser {
    pub fn new(factories: Vec<Arc<dyn PropertyFunctionFactory>>) -> Self {
        Self { factories }
    }

    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn PropertyFunctionFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn factories(&self) -> &[Arc<dyn PropertyFunctionFactory>] {
        &self.factories
    }

    fn factory_for(&self, function: &NamedNode) -> Option<&Arc<dyn PropertyFunctionFactory>> {
        self.factories
            .iter()
            .find(|factory| factory.is_property_function(function))
    }

    /// Extracts the property functions of a basic graph pattern.
    ///
    /// Returns [None] if the pattern does not invoke a property function.
    fn extract(&self, patterns: &[TriplePattern]) -> Option<Vec<TriplePattern>> {
        let mut consumed = vec![false; patterns.len()];
        let mut functions = Vec::new();

        for (index, pattern) in patterns.iter().enumerate() {
            let Some(pattern) = pattern.as_match() else {
                continue;
            };
            if consumed[index] {
                continue;
            }
            let PatternItem::Term(Term::NamedNode(function)) = &pattern.predicate else {
                continue;
            };
            let Some(factory) = self.factory_for(function) else {
                continue;
            };

            let mut used = vec![index];
            let subject_args = collect_arguments(patterns, &pattern.subject, &mut used);
            let object_args = collect_arguments(patterns, &pattern.object, &mut used);
            if used.iter().any(|index| consumed[*index]) {
                continue;
            }
            used.sort_unstable();

            let info = PropertyFunctionInfo {
                function: function.clone(),
                subject_args,
                object_args,
                patterns: used
                    .iter()
                    .filter_map(|index| patterns[*index].as_match().cloned())
                    .collect(),
            };
            let Some(function) = factory.try_create(&info) else {
                debug!(function = %info.function, "Property function rejected its arguments");
                continue;
            };

            for index in &used {
                consumed[*index] = true;
            }
            functions.push((used[0], function));
        }

        if functions.is_empty() {
            return None;
        }

        // Every function takes the place of the first pattern that it consumed.
        let mut result = Vec::with_capacity(patterns.len());
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some((_, function)) = functions.iter().find(|(first, _)| *first == index) {
                result.push(TriplePattern::PropertyFunction(function.clone()));
            } else if !consumed[index] {
                result.push(pattern.clone());
            }
        }
        Some(result)
    }
}

impl AlgebraOptimiser for PropertyFunctionOptimiser {
    fn name(&self) -> &str {
        "property_function"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        if self.factories.is_empty() {
            return Ok(Transformed::no(algebra));
        }

        algebra.transform_up(|node| {
            Ok(match node {
                Algebra::Bgp { patterns } => match self.extract(&patterns) {
                    Some(patterns) => Transformed::yes(Algebra::Bgp { patterns }),
                    None => Transformed::no(Algebra::Bgp { patterns }),
                },
                node => Transformed::no(node),
            })
        })
    }
}

/// Collects the arguments given by `item`.
///
/// If `item` is the head of an RDF collection, the members of the collection are the arguments
/// and the indices of the collection's patterns are added to `used`. Otherwise, `item` is the only
/// argument.
fn collect_arguments(
    patterns: &[TriplePattern],
    item: &PatternItem,
    used: &mut Vec<usize>,
) -> Vec<PatternItem> {
    let mut arguments = Vec::new();
    let mut list_patterns = Vec::new();
    let mut current = item.clone();

    loop {
        if is_nil(&current) && !list_patterns.is_empty() {
            used.extend(list_patterns);
            return arguments;
        }
        if !current.is_blank_variable() {
            break;
        }

        let first = find_list_pattern(patterns, &current, rdf::FIRST);
        let rest = find_list_pattern(patterns, &current, rdf::REST);
        let (Some(first), Some(rest)) = (first, rest) else {
            break;
        };
        if list_patterns.contains(&first) || list_patterns.contains(&rest) {
            break;
        }

        arguments.push(match &patterns[first] {
            TriplePattern::Match(pattern) => pattern.object.clone(),
            _ => break,
        });
        current = match &patterns[rest] {
            TriplePattern::Match(pattern) => pattern.object.clone(),
            _ => break,
        };
        list_patterns.push(first);
        list_patterns.push(rest);
    }

    vec![item.clone()]
}

fn find_list_pattern(
    patterns: &[TriplePattern],
    subject: &PatternItem,
    predicate: NamedNodeRef<'_>,
) -> Option<usize> {
    patterns.iter().position(|pattern| {
        pattern.as_match().is_some_and(|pattern| {
            pattern.subject == *subject
                && matches!(
                    &pattern.predicate,
                    PatternItem::Term(Term::NamedNode(node)) if node.as_ref() == predicate
                )
        })
    })
}

fn is_nil(item: &PatternItem) -> bool {
    matches!(item, PatternItem::Term(Term::NamedNode(node)) if node.as_ref() == rdf::NIL)
}
