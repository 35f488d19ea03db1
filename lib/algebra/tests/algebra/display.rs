use crate::utils::{iri, triple, var};
use rdf_rewrite_algebra::expr::{Expression, OrderExpression};
use rdf_rewrite_algebra::patterns::TriplePattern;
use rdf_rewrite_algebra::{Algebra, Query, QueryType};
use rdf_rewrite_model::Literal;

#[test]
fn test_display_select_query() {
    let query = Query::new(QueryType::Select, Algebra::bgp([triple("s", "p", "o")]))
        .with_variables(vec![var("s"), var("o")])
        .with_order_by(vec![OrderExpression::Asc(var("s").into())])
        .with_distinct()
        .with_limit(10);

    insta::assert_snapshot!(query.to_algebra(), @r"
    Slice: offset=0, limit=10
      Distinct
        Select: ?s ?o
          OrderBy: ASC(?s)
            Bgp: ?s <http://example.com/p> ?o
    ");
}

#[test]
fn test_display_ask_query_has_no_projection() {
    let query = Query::new(
        QueryType::Ask,
        Algebra::left_join(
            Algebra::bgp([triple("s", "p", "o")]),
            Algebra::bgp([triple("o", "q", "x")]),
            None,
        ),
    );

    insta::assert_snapshot!(query.to_algebra(), @r"
    LeftJoin
      Bgp: ?s <http://example.com/p> ?o
      Bgp: ?o <http://example.com/q> ?x
    ");
}

#[test]
fn test_display_embedded_patterns() {
    let algebra = Algebra::bgp([
        TriplePattern::from(triple("s", "p", "o")),
        TriplePattern::Filter(Expression::equal(var("o"), iri("c"))),
        TriplePattern::BindAssignment {
            variable: var("l"),
            expression: Literal::new_simple_literal("label").into(),
        },
    ]);

    insta::assert_snapshot!(algebra, @r#"Bgp: ?s <http://example.com/p> ?o . FILTER (?o = <http://example.com/c>) . BIND("label" AS ?l)"#);
}

#[test]
fn test_display_compact_form() {
    let algebra = Algebra::filter(
        Algebra::join(
            Algebra::bgp([triple("x", "p", "y")]),
            Algebra::bgp([triple("y", "q", "z")]),
        ),
        Expression::Bound(var("z")),
    );

    assert_eq!(
        format!("{algebra:#}"),
        "Filter: BOUND(?z) [Join [Bgp: ?x <http://example.com/p> ?y, Bgp: ?y <http://example.com/q> ?z]]"
    );
}
