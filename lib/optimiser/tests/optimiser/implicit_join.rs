use crate::utils::{triple, type_of, var};
use rdf_rewrite_algebra::expr::Expression;
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_optimiser::passes::ImplicitJoinOptimiser;
use rdf_rewrite_optimiser::{AlgebraOptimiser, OptimisationTarget};

fn optimise(optimiser: &ImplicitJoinOptimiser, algebra: Algebra) -> Algebra {
    optimiser.optimise(algebra, OptimisationTarget::Algebra)
}

#[test]
fn test_disjoint_join_becomes_filtered_product() {
    let algebra = Algebra::filter(
        Algebra::join(
            Algebra::bgp([type_of("x", "T")]),
            Algebra::bgp([type_of("y", "T")]),
        ),
        Expression::equal(var("x"), var("y")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra);

    assert!(matches!(result, Algebra::FilteredProduct { .. }));
    insta::assert_snapshot!(result, @r"
    FilteredProduct: (?x = ?y)
      Bgp: ?x <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.com/T>
      Bgp: ?y <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.com/T>
    ");
}

#[test]
fn test_subject_variables_are_substituted() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("x", "p", "z"), triple("y", "q", "z")]),
        Expression::equal(var("x"), var("y")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra);

    insta::assert_snapshot!(result, @r"
    Extend: ?y := ?x
      Bgp: ?x <http://example.com/p> ?z . ?x <http://example.com/q> ?z
    ");
}

#[test]
fn test_object_variables_fall_back_to_product() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("s", "p", "a"), triple("t", "q", "b")]),
        Expression::equal(var("a"), var("b")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra);

    insta::assert_snapshot!(result, @r"
    FilteredProduct: (?a = ?b)
      Bgp: ?s <http://example.com/p> ?a
      Bgp: ?t <http://example.com/q> ?b
    ");
}

#[test]
fn test_unsafe_optimisation_substitutes_objects() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("s", "p", "a"), triple("t", "q", "b")]),
        Expression::equal(var("a"), var("b")),
    );

    let result = optimise(&ImplicitJoinOptimiser::new(true), algebra);

    insta::assert_snapshot!(result, @r"
    Extend: ?b := ?a
      Bgp: ?s <http://example.com/p> ?a . ?t <http://example.com/q> ?a
    ");
}

#[test]
fn test_same_term_substitutes_objects() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("s", "p", "a"), triple("t", "q", "b")]),
        Expression::same_term(var("a"), var("b")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra);

    insta::assert_snapshot!(result, @r"
    Extend: ?b := ?a
      Bgp: ?s <http://example.com/p> ?a . ?t <http://example.com/q> ?a
    ");
}

#[test]
fn test_connected_objects_keep_filter() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("s", "p", "a"), triple("s", "q", "b")]),
        Expression::equal(var("a"), var("b")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra.clone());

    assert_eq!(result, algebra);
}

#[test]
fn test_variables_out_of_scope_keep_filter() {
    let algebra = Algebra::filter(
        Algebra::bgp([triple("x", "p", "z")]),
        Expression::equal(var("x"), var("unbound")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra.clone());

    assert_eq!(result, algebra);
}

#[test]
fn test_variables_shared_with_minus_keep_filter() {
    let algebra = Algebra::filter(
        Algebra::minus(
            Algebra::bgp([triple("x", "p", "y")]),
            Algebra::bgp([triple("y", "q", "x")]),
        ),
        Expression::same_term(var("x"), var("y")),
    );

    let result = optimise(&ImplicitJoinOptimiser::default(), algebra.clone());

    assert_eq!(result, algebra);
}
