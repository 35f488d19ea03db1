use crate::utils::{iri, triple, var};
use rdf_rewrite_algebra::patterns::{MatchPattern, TriplePattern};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_model::vocab::{opt, xsd};
use rdf_rewrite_model::{Graph, Literal, Triple};
use rdf_rewrite_optimiser::reorder::{QueryOptimiser, Weightings};

fn scenario_patterns() -> Vec<TriplePattern> {
    vec![
        triple("a", "p1", "x").into(),
        MatchPattern::new(var("x"), iri("p2"), Literal::new_simple_literal("literal")).into(),
    ]
}

#[test]
fn test_weighted_reordering_prefers_rare_predicates() {
    let weightings = Weightings::new()
        .with_predicate_count(iri("p1"), 1000)
        .with_predicate_count(iri("p2"), 1);

    let patterns = QueryOptimiser::weighted(weightings).optimise(scenario_patterns());

    insta::assert_snapshot!(Algebra::Bgp { patterns }, @r#"Bgp: ?x <http://example.com/p2> "literal" . ?a <http://example.com/p1> ?x"#);
}

#[test]
fn test_weighted_reordering_from_statistics_graph() {
    let mut graph = Graph::new();
    for (predicate, count) in [("p1", "1000"), ("p2", "1")] {
        graph.insert(&Triple::new(
            iri(predicate),
            opt::PREDICATE_COUNT.into_owned(),
            Literal::new_typed_literal(count, xsd::INTEGER),
        ));
    }
    let weightings = Weightings::from_graph(&graph).unwrap();

    let patterns = QueryOptimiser::weighted(weightings).optimise(scenario_patterns());

    assert_eq!(patterns[0], scenario_patterns()[1]);
    assert_eq!(patterns[1], scenario_patterns()[0]);
}

#[test]
fn test_equal_patterns_keep_order() {
    let patterns: Vec<TriplePattern> = vec![
        triple("a", "p", "b").into(),
        triple("c", "q", "d").into(),
        triple("e", "r", "f").into(),
    ];

    let heuristic = QueryOptimiser::heuristic().optimise(patterns.clone());
    let weighted = QueryOptimiser::weighted(Weightings::new()).optimise(patterns.clone());

    assert_eq!(heuristic, patterns);
    assert_eq!(weighted, patterns);
}

#[test]
fn test_reorders_nested_bgps() {
    let algebra = Algebra::union(
        Algebra::bgp([
            MatchPattern::new(var("s"), var("p"), var("o")),
            MatchPattern::new(var("s"), iri("p"), iri("o")),
        ]),
        Algebra::bgp([triple("a", "p", "b")]),
    );

    let result = QueryOptimiser::heuristic().optimise_algebra(algebra).unwrap();

    assert!(result.transformed);
    insta::assert_snapshot!(result.data, @r"
    Union
      Bgp: ?s <http://example.com/p> <http://example.com/o> . ?s ?p ?o
      Bgp: ?a <http://example.com/p> ?b
    ");
}

#[test]
fn test_chains_patterns_without_cross_product() {
    let patterns: Vec<TriplePattern> = vec![
        triple("a", "p", "b").into(),
        triple("b", "q", "c").into(),
        MatchPattern::new(iri("x"), iri("r"), var("c")).into(),
    ];

    let patterns = QueryOptimiser::heuristic().optimise(patterns);

    insta::assert_snapshot!(Algebra::Bgp { patterns }, @"Bgp: <http://example.com/x> <http://example.com/r> ?c . ?b <http://example.com/q> ?c . ?a <http://example.com/p> ?b");
}

#[test]
fn test_join_right_side_uses_left_side_variables() {
    let algebra = Algebra::join(
        Algebra::bgp([MatchPattern::new(var("s"), var("p"), var("o"))]),
        Algebra::bgp([
            MatchPattern::new(var("type"), iri("a"), iri("Class")),
            MatchPattern::new(var("s"), iri("a"), var("type")),
        ]),
    );

    let result = QueryOptimiser::heuristic().optimise_algebra(algebra).unwrap();

    assert!(result.transformed);
    insta::assert_snapshot!(result.data, @r"
    Join
      Bgp: ?s ?p ?o
      Bgp: ?s <http://example.com/a> ?type . ?type <http://example.com/a> <http://example.com/Class>
    ");
}
