use crate::utils::{iri, triple, var};
use datafusion::common::plan_err;
use datafusion::common::tree_node::Transformed;
use rdf_rewrite_algebra::expr::{Expression, OrderExpression};
use rdf_rewrite_algebra::patterns::TriplePattern;
use rdf_rewrite_algebra::{
    Algebra, Query, QueryType, UpdateCommand, UpdateCommandSet, UpdateCommandType,
};
use rdf_rewrite_common::DFResult;
use rdf_rewrite_optimiser::passes::ParallelEvaluationOptimiser;
use rdf_rewrite_optimiser::{
    default_optimisers, AlgebraOptimiser, OptimisationTarget, OptimiserConfig,
    OptimiserPipeline,
};
use std::sync::Arc;

#[derive(Debug)]
struct FailingOptimiser;

impl AlgebraOptimiser for FailingOptimiser {
    fn name(&self) -> &str {
        "failing"
    }

    fn rewrite(
        &self,
        _algebra: Algebra,
        _target: OptimisationTarget<'_>,
    ) -> DFResult<Transformed<Algebra>> {
        plan_err!("Forced failure")
    }
}

fn sample_algebras() -> Vec<Algebra> {
    vec![
        Algebra::filter(
            Algebra::join(
                Algebra::bgp([triple("x", "p", "z")]),
                Algebra::bgp([triple("y", "q", "w")]),
            ),
            Expression::equal(var("x"), var("y")),
        ),
        Algebra::filter(
            Algebra::bgp([triple("x", "p", "z"), triple("y", "q", "z")]),
            Expression::equal(var("x"), var("y")),
        ),
        Algebra::filter(
            Algebra::bgp([triple("x", "p", "z")]),
            Expression::equal(var("x"), iri("c")),
        ),
        Algebra::filter(
            Algebra::left_join(
                Algebra::bgp([triple("s", "p", "o")]),
                Algebra::bgp([triple("o", "q", "x")]),
                None,
            ),
            Expression::same_term(var("x"), iri("c")),
        ),
        Algebra::bgp([
            TriplePattern::from(triple("s", "p", "o")),
            TriplePattern::Filter(Expression::Bound(var("o"))),
            TriplePattern::from(triple("o", "q", "z")),
        ]),
        Algebra::union(
            Algebra::bgp([triple("s", "p", "o")]),
            Algebra::bgp([triple("a", "q", "b")]),
        ),
    ]
}

#[test]
fn test_failing_optimiser_is_contained() {
    let config = OptimiserConfig::default();
    let mut optimisers = default_optimisers(&config);
    optimisers.insert(3, Arc::new(FailingOptimiser));

    let mut pipeline = OptimiserPipeline::empty(config);
    for optimiser in optimisers {
        pipeline.add_optimiser(optimiser).unwrap();
    }
    let reference = OptimiserPipeline::new(config);

    for algebra in sample_algebras() {
        assert_eq!(
            pipeline.optimise(algebra.clone(), OptimisationTarget::Algebra),
            reference.optimise(algebra, OptimisationTarget::Algebra)
        );
    }
}

#[test]
fn test_default_optimisers_are_idempotent() {
    for optimiser in default_optimisers(&OptimiserConfig::default()) {
        for algebra in sample_algebras() {
            let once = optimiser.optimise(algebra, OptimisationTarget::Algebra);
            let twice = optimiser.optimise(once.clone(), OptimisationTarget::Algebra);
            assert_eq!(once, twice, "{} is not idempotent", optimiser.name());
        }
    }
}

#[test]
fn test_disabled_optimisation_keeps_algebra() {
    let pipeline =
        OptimiserPipeline::new(OptimiserConfig::default().with_algebra_optimisation(false));

    for algebra in sample_algebras() {
        assert_eq!(
            pipeline.optimise(algebra.clone(), OptimisationTarget::Algebra),
            algebra
        );
    }
}

#[test]
fn test_ordering_moves_above_distinct() {
    let query = Query::new(QueryType::Select, Algebra::bgp([triple("s", "p", "o")]))
        .with_variables(vec![var("s"), var("o")])
        .with_order_by(vec![OrderExpression::Asc(var("s").into())])
        .with_distinct();

    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    OrderBy: ASC(?s)
      Distinct
        Select: ?s ?o
          Bgp: ?s <http://example.com/p> ?o
    ");
}

#[test]
fn test_ask_query() {
    let query = Query::new(
        QueryType::Ask,
        Algebra::union(
            Algebra::bgp([triple("s", "p", "o")]),
            Algebra::bgp([triple("s", "q", "o")]),
        ),
    );

    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    AskUnion
      AskBgp: ?s <http://example.com/p> ?o
      AskBgp: ?s <http://example.com/q> ?o
    ");
}

#[test]
fn test_update_patterns_are_optimised() {
    let update = UpdateCommandSet::new(vec![
        UpdateCommand::new(UpdateCommandType::Modify).with_pattern(Algebra::filter(
            Algebra::bgp([triple("x", "p", "o")]),
            Expression::equal(var("x"), iri("c")),
        )),
        UpdateCommand::new(UpdateCommandType::Clear),
    ]);

    let optimised = OptimiserPipeline::default().optimise_update(&update);

    assert_eq!(optimised.commands().len(), 2);
    assert_eq!(optimised.commands()[1].pattern(), None);
    insta::assert_snapshot!(optimised.commands()[0].pattern().unwrap(), @r"
    Extend: ?x := <http://example.com/c>
      Bgp: <http://example.com/c> <http://example.com/p> ?o
    ");
}

#[test]
fn test_parallel_evaluation() {
    let mut pipeline = OptimiserPipeline::empty(OptimiserConfig::default());
    pipeline
        .add_optimiser(Arc::new(ParallelEvaluationOptimiser::new()))
        .unwrap();
    let algebra = Algebra::join(
        Algebra::union(
            Algebra::bgp([triple("s", "p", "o")]),
            Algebra::bgp([triple("a", "q", "b")]),
        ),
        Algebra::bgp([triple("o", "r", "z")]),
    );

    insta::assert_snapshot!(pipeline.optimise(algebra, OptimisationTarget::Algebra), @r"
    Join
      ParallelUnion
        Bgp: ?s <http://example.com/p> ?o
        Bgp: ?a <http://example.com/q> ?b
      Bgp: ?o <http://example.com/r> ?z
    ");
}
