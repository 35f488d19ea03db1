use crate::utils::{triple, var};
use rdf_rewrite_algebra::expr::OrderExpression;
use rdf_rewrite_algebra::patterns::MatchPattern;
use rdf_rewrite_algebra::{Algebra, Query, QueryType};
use rdf_rewrite_model::vocab::rdf;
use rdf_rewrite_optimiser::passes::LazyBgpOptimiser;
use rdf_rewrite_optimiser::{AlgebraOptimiser, OptimiserPipeline};

fn type_query() -> Query {
    Query::new(
        QueryType::Select,
        Algebra::bgp([MatchPattern::new(
            var("s"),
            rdf::TYPE.into_owned(),
            var("type"),
        )]),
    )
}

#[test]
fn test_limit_makes_bgp_lazy() {
    let query = type_query().with_limit(5);

    assert!(LazyBgpOptimiser::new().is_applicable(&query));
    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    Slice: offset=0, limit=5
      Select: *
        LazyBgp(5): ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?type
    ");
}

#[test]
fn test_distinct_prevents_lazy_evaluation() {
    let query = type_query().with_limit(5).with_distinct();

    assert!(!LazyBgpOptimiser::new().is_applicable(&query));
    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    Slice: offset=0, limit=5
      Distinct
        Select: *
          Bgp: ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?type
    ");
}

#[test]
fn test_lazy_union() {
    let query = Query::new(
        QueryType::Select,
        Algebra::union(
            Algebra::bgp([triple("s", "p", "o")]),
            Algebra::bgp([triple("s", "q", "o")]),
        ),
    )
    .with_limit(2)
    .with_offset(1);

    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    Slice: offset=1, limit=2
      Select: *
        LazyUnion(3)
          LazyBgp(3): ?s <http://example.com/p> ?o
          LazyBgp(3): ?s <http://example.com/q> ?o
    ");
}

#[test]
fn test_ordering_by_first_pattern_is_lazy() {
    let query = Query::new(
        QueryType::Select,
        Algebra::bgp([triple("s", "p", "o"), triple("o", "q", "z")]),
    )
    .with_order_by(vec![OrderExpression::Asc(var("s").into())])
    .with_limit(1);
    assert!(LazyBgpOptimiser::new().is_applicable(&query));

    let query = query.with_order_by(vec![OrderExpression::Asc(var("z").into())]);
    assert!(!LazyBgpOptimiser::new().is_applicable(&query));
}
