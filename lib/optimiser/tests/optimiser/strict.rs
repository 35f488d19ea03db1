use crate::utils::{iri, triple, var};
use rdf_rewrite_algebra::expr::Expression;
use rdf_rewrite_algebra::patterns::{
    MatchPattern, PathPattern, PatternItem, PropertyFunctionPattern, TriplePattern,
};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_model::{BlankNode, PropertyPathExpression};
use rdf_rewrite_optimiser::passes::StrictAlgebraOptimiser;
use rdf_rewrite_optimiser::{AlgebraOptimiser, OptimisationTarget};

#[test]
fn test_embedded_patterns_become_operators() {
    let algebra = Algebra::bgp([
        TriplePattern::from(triple("s", "p", "o")),
        TriplePattern::Filter(Expression::Bound(var("o"))),
        TriplePattern::from(triple("o", "q", "z")),
        TriplePattern::BindAssignment {
            variable: var("w"),
            expression: var("z").into(),
        },
    ]);

    let result = StrictAlgebraOptimiser::new()
        .rewrite(algebra, OptimisationTarget::Algebra)
        .unwrap();

    assert!(result.transformed);
    insta::assert_snapshot!(result.data, @r"
    Extend: ?w := ?z
      Join
        Filter: BOUND(?o)
          Bgp: ?s <http://example.com/p> ?o
        Bgp: ?o <http://example.com/q> ?z
    ");
}

#[test]
fn test_trailing_patterns_are_joined() {
    let algebra = Algebra::bgp([
        TriplePattern::Filter(Expression::equal(var("o"), iri("c"))),
        TriplePattern::from(triple("s", "p", "o")),
    ]);

    let result = StrictAlgebraOptimiser::new()
        .optimise(algebra, OptimisationTarget::Algebra);

    insta::assert_snapshot!(result, @r"
    Join
      Filter: (?o = <http://example.com/c>)
        Bgp
      Bgp: ?s <http://example.com/p> ?o
    ");
}

#[test]
fn test_blank_variables_prevent_rewrite() {
    let algebra = Algebra::bgp([
        TriplePattern::from(MatchPattern::new(
            PatternItem::BlankVariable(BlankNode::new_unchecked("b")),
            iri("p"),
            var("o"),
        )),
        TriplePattern::Filter(Expression::equal(var("o"), iri("c"))),
    ]);

    let result = StrictAlgebraOptimiser::new()
        .rewrite(algebra.clone(), OptimisationTarget::Algebra)
        .unwrap();

    assert!(!result.transformed);
    assert_eq!(result.data, algebra);
}

#[test]
fn test_plain_matches_are_kept() {
    let algebra = Algebra::bgp([triple("s", "p", "o"), triple("o", "q", "z")]);

    let result = StrictAlgebraOptimiser::new()
        .rewrite(algebra.clone(), OptimisationTarget::Algebra)
        .unwrap();

    assert!(!result.transformed);
    assert_eq!(result.data, algebra);
}

#[test]
fn test_paths_and_property_functions_become_operators() {
    let algebra = Algebra::bgp([
        TriplePattern::from(triple("s", "p", "o")),
        TriplePattern::Path(PathPattern::new(
            var("o"),
            PropertyPathExpression::NamedNode(iri("next")),
            var("z"),
        )),
        TriplePattern::PropertyFunction(PropertyFunctionPattern::new(
            iri("function"),
            vec![var("z").into()],
            vec![var("label").into()],
            Vec::new(),
        )),
    ]);

    let result = StrictAlgebraOptimiser::new()
        .rewrite(algebra, OptimisationTarget::Algebra)
        .unwrap();

    insta::assert_snapshot!(result.data, @r"
    PropertyFunction: <http://example.com/function>(?z ; ?label)
      Join
        Bgp: ?s <http://example.com/p> ?o
        PropertyPath: ?o <http://example.com/next> ?z
    ");
}
