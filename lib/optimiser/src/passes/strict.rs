use crate::{AlgebraOptimiser, OptimisationTarget};
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::patterns::{has_only_plain_variables, MatchPattern, TriplePattern};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;
use std::sync::Arc;

/// Rewrites basic graph patterns that embed filters, assignments, sub-queries, paths, or property
/// functions into explicit algebra operators.
///
/// The embedded patterns keep their position. Each one applies to the patterns that precede it.
/// Basic graph patterns that only contain matches or that contain blank variables are kept.
#[derive(Debug)]
pub struct StrictAlgebraOptimiser;

impl StrictAlgebraOptimiser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StrictAlgebraOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraOptimiser for StrictAlgebraOptimiser {
    fn name(&self) -> &str {
        "strict_algebra"
    }

    fn rewrite(
        &self,
        algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        algebra.transform_up(|node| {
            Ok(match node {
                Algebra::Bgp { patterns } if is_strictable(&patterns) => {
                    Transformed::yes(to_strict_algebra(patterns))
                }
                node => Transformed::no(node),
            })
        })
    }
}

fn is_strictable(patterns: &[TriplePattern]) -> bool {
    patterns
        .iter()
        .any(|pattern| !matches!(pattern, TriplePattern::Match(_)))
        && has_only_plain_variables(patterns)
}

fn to_strict_algebra(patterns: Vec<TriplePattern>) -> Algebra {
    let mut current = None;
    let mut run = Vec::new();

    for pattern in patterns {
        current = Some(match pattern {
            TriplePattern::Match(pattern) => {
                run.push(pattern);
                continue;
            }
            TriplePattern::Filter(expression) => {
                Algebra::filter(flush_run(current.take(), &mut run), expression)
            }
            TriplePattern::BindAssignment {
                variable,
                expression,
            }
            | TriplePattern::LetAssignment {
                variable,
                expression,
            } => Algebra::extend(flush_run(current.take(), &mut run), variable, expression),
            TriplePattern::SubQuery(query) => Algebra::join(
                flush_run(current.take(), &mut run),
                Algebra::SubQuery { query },
            ),
            TriplePattern::Path(path) => Algebra::join(
                flush_run(current.take(), &mut run),
                Algebra::PropertyPath(path),
            ),
            TriplePattern::PropertyFunction(function) => Algebra::PropertyFunction {
                inner: Arc::new(flush_run(current.take(), &mut run)),
                function,
            },
        });
    }

    flush_run(current, &mut run)
}

/// Joins the pending match patterns onto `current`.
fn flush_run(current: Option<Algebra>, run: &mut Vec<MatchPattern>) -> Algebra {
    let bgp = Algebra::bgp(run.drain(..));
    match current {
        None => bgp,
        Some(current) => Algebra::join(current, bgp),
    }
}
