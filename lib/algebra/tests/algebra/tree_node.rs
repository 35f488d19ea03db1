use crate::utils::triple;
use datafusion::common::tree_node::{Transformed, TreeNode};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::DFResult;

fn to_ask(algebra: Algebra) -> DFResult<Transformed<Algebra>> {
    Ok(match algebra {
        Algebra::Bgp { patterns } => Transformed::yes(Algebra::AskBgp { patterns }),
        other => Transformed::no(other),
    })
}

#[test]
fn test_transform_up_visits_every_bgp() -> DFResult<()> {
    let algebra = Algebra::union(
        Algebra::bgp([triple("s", "p", "o")]),
        Algebra::distinct(Algebra::bgp([triple("s", "q", "o")])),
    );

    let result = algebra.transform_up(to_ask)?;

    assert!(result.transformed);
    insta::assert_snapshot!(result.data, @r"
    Union
      AskBgp: ?s <http://example.com/p> ?o
      Distinct
        AskBgp: ?s <http://example.com/q> ?o
    ");
    Ok(())
}

#[test]
fn test_map_rhs_only_transforms_rhs() -> DFResult<()> {
    let algebra = Algebra::left_join(
        Algebra::bgp([triple("s", "p", "o")]),
        Algebra::bgp([triple("o", "q", "x")]),
        None,
    );

    let result = algebra.map_rhs(to_ask)?;

    assert!(result.transformed);
    insta::assert_snapshot!(result.data, @r"
    LeftJoin
      Bgp: ?s <http://example.com/p> ?o
      AskBgp: ?o <http://example.com/q> ?x
    ");
    Ok(())
}

#[test]
fn test_map_lhs_ignores_unary_nodes() -> DFResult<()> {
    let algebra = Algebra::distinct(Algebra::bgp([triple("s", "p", "o")]));

    let result = algebra.clone().map_lhs(to_ask)?;

    assert!(!result.transformed);
    assert_eq!(result.data, algebra);
    Ok(())
}

#[test]
fn test_exists_finds_nested_node() -> DFResult<()> {
    let algebra = Algebra::join(
        Algebra::bgp([triple("s", "p", "o")]),
        Algebra::filter(Algebra::bgp([triple("o", "q", "x")]), true.into()),
    );

    assert!(algebra.exists(|node| Ok(matches!(node, Algebra::Filter { .. })))?);
    assert!(!algebra.exists(|node| Ok(matches!(node, Algebra::Union { .. })))?);
    Ok(())
}
