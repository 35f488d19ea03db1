use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use datafusion::error::DataFusionError;
use rdf_rewrite_algebra::expr::{Expression, ExpressionTransformer};
use rdf_rewrite_algebra::patterns::{has_only_plain_variables, MatchPattern, PatternItem, TriplePattern};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::{DFResult, VirtualRdfProvider};
use rdf_rewrite_model::VirtualNode;
use std::sync::Arc;

/// Replaces the constants of an algebra with the ids of a storage layer.
///
/// Evaluators that work on ids can then skip the lookup of the constants. A basic graph pattern
/// that contains a term unknown to the storage layer cannot have any solution and is replaced by
/// [Algebra::Null].
///
/// This optimiser is not part of the default pipeline.
#[derive(Debug, Clone)]
pub struct VirtualAlgebraOptimiser {
    provider: Arc<dyn VirtualRdfProvider>,
}

impl VirtualAlgebraOptimiser {
    pub fn new(provider: Arc<dyn VirtualRdfProvider>) -> Self {
        Self { provider }
    }

    fn optimise_node(&self, algebra: Algebra) -> DFResult<Transformed<Algebra>> {
        Ok(match algebra {
            Algebra::Bgp { patterns } => {
                self.virtualise_bgp(patterns, |patterns| Algebra::Bgp { patterns })?
            }
            Algebra::LazyBgp {
                patterns,
                required_results,
            } => self.virtualise_bgp(patterns, |patterns| Algebra::LazyBgp {
                patterns,
                required_results,
            })?,
            Algebra::AskBgp { patterns } => {
                self.virtualise_bgp(patterns, |patterns| Algebra::AskBgp { patterns })?
            }
            Algebra::Filter { inner, expression } => self
                .virtualise_expression(expression)?
                .update_data(|expression| Algebra::Filter { inner, expression }),
            Algebra::Having { inner, expression } => self
                .virtualise_expression(expression)?
                .update_data(|expression| Algebra::Having { inner, expression }),
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => self
                .virtualise_expression(expression)?
                .update_data(|expression| Algebra::Extend {
                    inner,
                    variable,
                    expression,
                }),
            Algebra::IdentityFilter {
                inner,
                variable,
                term,
            } => self
                .virtualise_expression(term)?
                .update_data(|term| Algebra::IdentityFilter {
                    inner,
                    variable,
                    term,
                }),
            Algebra::SameTermFilter {
                inner,
                variable,
                term,
            } => self
                .virtualise_expression(term)?
                .update_data(|term| Algebra::SameTermFilter {
                    inner,
                    variable,
                    term,
                }),
            Algebra::FilteredProduct {
                lhs,
                rhs,
                expression,
            } => self
                .virtualise_expression(expression)?
                .update_data(|expression| Algebra::FilteredProduct {
                    lhs,
                    rhs,
                    expression,
                }),
            Algebra::LeftJoin {
                lhs,
                rhs,
                filter: Some(filter),
            } => self
                .virtualise_expression(filter)?
                .update_data(|filter| Algebra::LeftJoin {
                    lhs,
                    rhs,
                    filter: Some(filter),
                }),
            node => Transformed::no(node),
        })
    }

    fn virtualise_bgp(
        &self,
        patterns: Vec<TriplePattern>,
        rebuild: impl FnOnce(Vec<TriplePattern>) -> Algebra,
    ) -> DFResult<Transformed<Algebra>> {
        if !has_only_plain_variables(&patterns) {
            return Ok(Transformed::no(rebuild(patterns)));
        }

        let mut virtualised = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            virtualised.push(match pattern {
                TriplePattern::Match(pattern) => {
                    let Some(pattern) = self.virtualise_match(pattern) else {
                        // A constant that is not stored cannot be matched.
                        let variables = rebuild(patterns.clone()).variables();
                        return Ok(Transformed::yes(Algebra::Null { variables }));
                    };
                    TriplePattern::Match(pattern)
                }
                TriplePattern::Filter(expression) => {
                    TriplePattern::Filter(self.virtualise_expression(expression.clone())?.data)
                }
                TriplePattern::BindAssignment {
                    variable,
                    expression,
                } => TriplePattern::BindAssignment {
                    variable: variable.clone(),
                    expression: self.virtualise_expression(expression.clone())?.data,
                },
                TriplePattern::LetAssignment {
                    variable,
                    expression,
                } => TriplePattern::LetAssignment {
                    variable: variable.clone(),
                    expression: self.virtualise_expression(expression.clone())?.data,
                },
                pattern => pattern.clone(),
            });
        }

        Ok(if virtualised == patterns {
            Transformed::no(rebuild(patterns))
        } else {
            Transformed::yes(rebuild(virtualised))
        })
    }

    fn virtualise_match(&self, pattern: &MatchPattern) -> Option<MatchPattern> {
        Some(MatchPattern {
            subject: self.virtualise_item(&pattern.subject)?,
            predicate: self.virtualise_item(&pattern.predicate)?,
            object: self.virtualise_item(&pattern.object)?,
        })
    }

    fn virtualise_item(&self, item: &PatternItem) -> Option<PatternItem> {
        match item {
            PatternItem::Term(term) => {
                let id = self.provider.try_get_id(term.as_ref())?;
                Some(PatternItem::Virtual(VirtualNode::new(id, term.clone())))
            }
            item => Some(item.clone()),
        }
    }

    fn virtualise_expression(&self, expression: Expression) -> DFResult<Transformed<Expression>> {
        let virtualised = ExpressionVirtualiser { optimiser: self }.transform(expression.clone())?;
        Ok(if virtualised == expression {
            Transformed::no(expression)
        } else {
            Transformed::yes(virtualised)
        })
    }
}

impl AlgebraOptimiser for VirtualAlgebraOptimiser {
    fn name(&self) -> &str {
        "virtual_algebra"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        algebra.transform_up(|node| self.optimise_node(node))
    }
}

struct ExpressionVirtualiser<'a> {
    optimiser: &'a VirtualAlgebraOptimiser,
}

impl ExpressionTransformer for ExpressionVirtualiser<'_> {
    type Error = DataFusionError;

    fn transform_primary(&self, expression: Expression) -> DFResult<Expression> {
        Ok(match expression {
            Expression::Constant(term) => match self.optimiser.provider.try_get_id(term.as_ref()) {
                Some(id) => Expression::Virtual(VirtualNode::new(id, term)),
                None => Expression::Constant(term),
            },
            Expression::Exists(pattern) => {
                let pattern = self.optimiser.rewrite(
                    Arc::unwrap_or_clone(pattern),
                    OptimisationTarget::Algebra,
                )?;
                Expression::Exists(Arc::new(pattern.data))
            }
            expression => expression,
        })
    }
}
