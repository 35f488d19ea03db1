use crate::utils::{iri, triple, var};
use rdf_rewrite_algebra::expr::Expression;
use rdf_rewrite_algebra::patterns::{MatchPattern, PathPattern};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_model::{Literal, NamedNode, PropertyPathExpression};
use std::sync::Arc;
use rdf_rewrite_optimiser::passes::IdentityFilterOptimiser;
use rdf_rewrite_optimiser::{AlgebraOptimiser, OptimisationTarget};

fn optimise(algebra: Algebra) -> Algebra {
    IdentityFilterOptimiser::new().optimise(algebra, OptimisationTarget::Algebra)
}

#[test]
fn test_constant_is_substituted() {
    let constant = NamedNode::new_unchecked("http://example/c");
    let algebra = Algebra::filter(
        Algebra::join(
            Algebra::bgp([triple("x", "p", "y")]),
            Algebra::bgp([triple("y", "q", "x")]),
        ),
        Expression::equal(var("x"), constant),
    );

    let result = optimise(algebra);

    assert_eq!(result.to_string().matches("?x").count(), 1);
    insta::assert_snapshot!(result, @r"
    Extend: ?x := <http://example/c>
      Join
        Bgp: <http://example/c> <http://example.com/p> ?y
        Bgp: ?y <http://example.com/q> <http://example/c>
    ");
}

#[test]
fn test_constant_on_the_left() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("x", "p", "y")]),
        Expression::equal(iri("c"), var("x")),
    );

    insta::assert_snapshot!(optimise(algebra), @r"
    Extend: ?x := <http://example.com/c>
      Bgp: <http://example.com/c> <http://example.com/p> ?y
    ");
}

#[test]
fn test_optional_variable_uses_identity_filter() {
    let algebra = Algebra::filter(
        Algebra::left_join(
            Algebra::bgp([triple("s", "p", "o")]),
            Algebra::bgp([triple("o", "q", "x")]),
            None,
        ),
        Expression::equal(var("x"), iri("c")),
    );

    insta::assert_snapshot!(optimise(algebra), @r"
    IdentityFilter: ?x = <http://example.com/c>
      LeftJoin
        Bgp: ?s <http://example.com/p> ?o
        Bgp: ?o <http://example.com/q> ?x
    ");
}

#[test]
fn test_literal_equality_is_kept() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("s", "p", "o")]),
        Expression::equal(var("o"), Literal::from(1)),
    );

    let result = optimise(algebra.clone());

    assert_eq!(result, algebra);
}

#[test]
fn test_same_term_substitutes_literals() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("s", "p", "o")]),
        Expression::same_term(var("o"), Literal::new_simple_literal("a")),
    );

    insta::assert_snapshot!(optimise(algebra), @r#"
    Extend: ?o := "a"
      Bgp: ?s <http://example.com/p> "a"
    "#);
}

#[test]
fn test_nested_filters_are_rewritten() {
    let algebra = Algebra::join(
        Algebra::filter(
            Algebra::bgp([MatchPattern::new(var("x"), iri("p"), var("y"))]),
            Expression::equal(var("x"), iri("c")),
        ),
        Algebra::bgp([triple("y", "q", "z")]),
    );

    insta::assert_snapshot!(optimise(algebra), @r"
    Join
      Extend: ?x := <http://example.com/c>
        Bgp: <http://example.com/c> <http://example.com/p> ?y
      Bgp: ?y <http://example.com/q> ?z
    ");
}

#[test]
fn test_filter_is_not_moved_below_slice() {
    let algebra = Algebra::filter(
        Algebra::slice(Algebra::bgp([triple("x", "p", "o")]), Some(5), 0),
        Expression::equal(var("x"), iri("c")),
    );

    insta::assert_snapshot!(optimise(algebra), @r"
    IdentityFilter: ?x = <http://example.com/c>
      Slice: offset=0, limit=5
        Bgp: ?x <http://example.com/p> ?o
    ");
}

#[test]
fn test_variable_shared_with_minus_is_kept() {
    let algebra = Algebra::filter(
        Algebra::minus(
            Algebra::bgp([triple("x", "p", "o")]),
            Algebra::bgp([triple("x", "q", "z")]),
        ),
        Expression::equal(var("x"), iri("c")),
    );

    insta::assert_snapshot!(optimise(algebra), @r"
    IdentityFilter: ?x = <http://example.com/c>
      Minus
        Bgp: ?x <http://example.com/p> ?o
        Bgp: ?x <http://example.com/q> ?z
    ");
}

#[test]
fn test_minus_without_shared_variable_is_substituted() {
    let algebra = Algebra::filter(
        Algebra::minus(
            Algebra::bgp([triple("x", "p", "o")]),
            Algebra::bgp([triple("s", "q", "o")]),
        ),
        Expression::equal(var("x"), iri("c")),
    );

    insta::assert_snapshot!(optimise(algebra), @r"
    Extend: ?x := <http://example.com/c>
      Minus
        Bgp: <http://example.com/c> <http://example.com/p> ?o
        Bgp: ?s <http://example.com/q> ?o
    ");
}

#[test]
fn test_property_path_falls_back_to_identity_filter() {
    let path = PathPattern::new(
        var("x"),
        PropertyPathExpression::OneOrMore(Box::new(PropertyPathExpression::NamedNode(iri(
            "next",
        )))),
        var("y"),
    );
    let join = Algebra::join(
        Algebra::bgp([triple("x", "p", "o")]),
        Algebra::PropertyPath(path),
    );
    let algebra = Algebra::filter(join.clone(), Expression::equal(var("x"), iri("c")));

    let result = optimise(algebra);

    assert_eq!(
        result,
        Algebra::IdentityFilter {
            inner: Arc::new(join),
            variable: var("x"),
            term: Expression::Constant(iri("c").into()),
        }
    );
}
