use rdf_rewrite_algebra::UpdateCommandType;
use rdf_rewrite_optimiser::reorder::QueryOptimiser;
use rdf_rewrite_optimiser::OptimiserPipeline;
use rdf_rewrite_sparql::parse_update;

#[test]
fn test_modify_exposes_where_clause() {
    let update = parse_update(
        "DELETE { ?s ?p ?o } WHERE { ?s ?p ?o . ?s <http://example.com/p> <http://example.com/c> }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    assert_eq!(update.commands().len(), 1);
    let command = &update.commands()[0];
    assert_eq!(command.command_type(), UpdateCommandType::Modify);
    insta::assert_snapshot!(command.pattern().unwrap(), @"Bgp: ?s <http://example.com/p> <http://example.com/c> . ?s ?p ?o");
}

#[test]
fn test_commands_without_pattern() {
    let update = parse_update(
        "INSERT DATA { <http://example.com/s> <http://example.com/p> \"o\" } ; CLEAR ALL",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    let types = update
        .commands()
        .iter()
        .map(|command| command.command_type())
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![UpdateCommandType::InsertData, UpdateCommandType::Clear]
    );
    assert!(update.commands().iter().all(|c| c.pattern().is_none()));
}

#[test]
fn test_update_patterns_are_optimised() {
    let update = parse_update(
        "DELETE { ?s ?p ?o } WHERE { ?s ?p ?o FILTER(?s = <http://example.com/c>) }",
        None,
        &QueryOptimiser::default(),
    )
    .unwrap();

    let optimised = OptimiserPipeline::default().optimise_update(&update);
    insta::assert_snapshot!(optimised.commands()[0].pattern().unwrap(), @r"
    Extend: ?s := <http://example.com/c>
      Bgp: <http://example.com/c> ?p ?o
    ");
}
