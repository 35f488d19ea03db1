use rdf_rewrite_algebra::{Algebra, QueryType};
use rdf_rewrite_model::{NamedNode, Variable};
use rdf_rewrite_optimiser::reorder::QueryOptimiser;
use rdf_rewrite_optimiser::OptimiserPipeline;
use rdf_rewrite_sparql::{parse_query, SparqlError};

fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

#[test]
fn test_modifiers_are_kept_in_query() {
    let query = parse_query(
        "SELECT DISTINCT ?name WHERE { ?s ?p ?o . ?s <http://example.com/name> ?name } \
         ORDER BY ?name LIMIT 10 OFFSET 2",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    assert_eq!(query.query_type(), QueryType::Select);
    assert_eq!(query.limit(), Some(10));
    assert_eq!(query.offset(), 2);
    assert!(query.has_distinct_modifier());
    assert_eq!(query.projected_variables(), vec![var("name")]);
    insta::assert_snapshot!(query.to_algebra(), @r"
    Slice: offset=2, limit=10
      Distinct
        Select: ?name
          OrderBy: ASC(?name)
            Bgp: ?s <http://example.com/name> ?name . ?s ?p ?o
    ");
}

#[test]
fn test_no_reorder_keeps_pattern_order() {
    let query = parse_query(
        "SELECT ?name WHERE { ?s ?p ?o . ?s <http://example.com/name> ?name }",
        None,
        &QueryOptimiser::no_reorder(),
    )
    .unwrap();

    insta::assert_snapshot!(query.pattern(), @"Bgp: ?s ?p ?o . ?s <http://example.com/name> ?name");
}

#[test]
fn test_filter_is_embedded_into_bgp() {
    let query = parse_query(
        "SELECT ?s ?o WHERE { ?s <http://example.com/p> ?o FILTER(?o = <http://example.com/c>) }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    insta::assert_snapshot!(query.pattern(), @"Bgp: ?s <http://example.com/p> ?o . FILTER (?o = <http://example.com/c>)");
    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    Select: ?s ?o
      Extend: ?o := <http://example.com/c>
        Bgp: ?s <http://example.com/p> <http://example.com/c>
    ");
}

#[test]
fn test_bind_is_embedded_into_bgp() {
    let query = parse_query(
        "SELECT ?s ?label WHERE { ?s <http://example.com/p> ?o BIND(STR(?o) AS ?label) }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    let patterns = query.pattern().patterns().unwrap();
    assert_eq!(patterns.len(), 2);
    assert!(patterns[0].as_match().is_some());
    assert!(query.projections().is_empty());
}

#[test]
fn test_limit_makes_parsed_bgp_lazy() {
    let query = parse_query(
        "SELECT ?s ?type WHERE { ?s a ?type } LIMIT 5",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    insta::assert_snapshot!(OptimiserPipeline::default().optimise_query(&query), @r"
    Slice: offset=0, limit=5
      Select: ?s ?type
        LazyBgp(5): ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?type
    ");
}

#[test]
fn test_ask_query() {
    let query = parse_query(
        "ASK { ?s <http://example.com/p> ?o }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    assert_eq!(query.query_type(), QueryType::Ask);
    assert!(!query.has_solution_modifiers());
    insta::assert_snapshot!(
        OptimiserPipeline::default().optimise_query(&query),
        @"AskBgp: ?s <http://example.com/p> ?o"
    );
}

#[test]
fn test_nested_select_becomes_sub_query() {
    let query = parse_query(
        "SELECT ?s WHERE { \
           ?s <http://example.com/p> ?o \
           { SELECT ?o WHERE { ?o <http://example.com/q> ?x } LIMIT 1 } \
         }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    let Algebra::Join { rhs, .. } = query.pattern() else {
        panic!("expected a join, got {}", query.pattern());
    };
    let Algebra::SubQuery { query: sub_query } = rhs.as_ref() else {
        panic!("expected a sub-query, got {rhs}");
    };
    assert_eq!(sub_query.limit(), Some(1));
    assert_eq!(sub_query.projected_variables(), vec![var("o")]);
}

#[test]
fn test_aggregation() {
    let query = parse_query(
        "SELECT ?s (COUNT(?o) AS ?count) WHERE { ?s <http://example.com/p> ?o } \
         GROUP BY ?s HAVING (COUNT(?o) > 1)",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    assert!(query.is_aggregate());
    assert_eq!(query.group_by(), Some([var("s")].as_slice()));
    assert!(!query.aggregates().is_empty());
    assert!(query.having().is_some());
    assert_eq!(query.projections().len(), 1);
    assert_eq!(query.projections()[0].0, var("count"));
    assert_eq!(query.projected_variables(), vec![var("s"), var("count")]);
    assert!(matches!(query.pattern(), Algebra::Bgp { .. }));
}

#[test]
fn test_trailing_values_become_bindings() {
    let query = parse_query(
        "SELECT ?s ?o WHERE { ?s <http://example.com/p> ?o } \
         VALUES ?o { <http://example.com/a> <http://example.com/b> }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    let bindings = query.bindings().unwrap();
    assert_eq!(bindings.variables(), &[var("o")]);
    assert_eq!(bindings.rows().len(), 2);
    assert_eq!(
        bindings.rows()[0],
        vec![Some(NamedNode::new_unchecked("http://example.com/a").into())]
    );
    assert!(matches!(query.pattern(), Algebra::Bgp { .. }));
}

#[test]
fn test_syntax_error() {
    let result = parse_query("SELECT WHERE {", None, &QueryOptimiser::default());
    assert!(matches!(result, Err(SparqlError::Syntax(_))));
}

#[test]
fn test_patterns_are_chained_by_shared_variables() {
    let query = parse_query(
        "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
        SELECT ?s WHERE {
          ?s a ?type .
          ?value rdfs:label ?label .
          ?s <http://example.org/predicate> ?value .
        }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    insta::assert_snapshot!(query.pattern(), @"Bgp: ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?type . ?s <http://example.org/predicate> ?value . ?value <http://www.w3.org/2000/01/rdf-schema#label> ?label");
}

#[test]
fn test_optional_patterns_use_variables_bound_before() {
    let query = parse_query(
        "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
        SELECT ?s ?type WHERE {
          ?s ?p ?o
          OPTIONAL {
            ?type a rdfs:Class .
            ?s a ?type .
          }
        }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    insta::assert_snapshot!(query.pattern(), @r"
    LeftJoin
      Bgp: ?s ?p ?o
      Bgp: ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?type . ?type <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2000/01/rdf-schema#Class>
    ");
}
