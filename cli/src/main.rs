use crate::cli::{Args, Command};
use anyhow::{bail, Context};
use clap::Parser;
use oxttl::TurtleParser;
use rdf_rewrite_algebra::UpdateCommandType;
use rdf_rewrite_model::Graph;
use rdf_rewrite_optimiser::passes::ParallelEvaluationOptimiser;
use rdf_rewrite_optimiser::reorder::{QueryOptimiser, Weightings};
use rdf_rewrite_optimiser::{OptimiserConfig, OptimiserPipeline};
use rdf_rewrite_sparql::{parse_query, parse_update};
use std::fs::{self, File};
use std::io::{stdin, stdout, BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Explain {
            query,
            update,
            base,
            statistics,
            unsafe_optimisation,
            no_reorder,
            no_optimisation,
            without,
            parallel,
        } => {
            let config = OptimiserConfig::new()
                .with_unsafe_optimisation(unsafe_optimisation)
                .with_algebra_optimisation(!no_optimisation);
            let mut pipeline = OptimiserPipeline::new(config);
            pipeline.set_query_optimiser(if no_reorder {
                QueryOptimiser::no_reorder()
            } else if let Some(statistics) = &statistics {
                QueryOptimiser::weighted(load_statistics(statistics)?)
            } else {
                QueryOptimiser::heuristic()
            });
            for name in &without {
                if !pipeline.remove_optimiser(name) {
                    bail!("There is no optimiser called '{name}'");
                }
            }
            if parallel {
                pipeline.add_optimiser(Arc::new(ParallelEvaluationOptimiser::new()))?;
            }

            let mut out = stdout().lock();
            match (query, update) {
                (Some(query), _) => {
                    explain_query(&pipeline, &read_sparql(&query)?, base.as_deref(), &mut out)?;
                }
                (None, Some(update)) => {
                    explain_update(&pipeline, &read_sparql(&update)?, base.as_deref(), &mut out)?;
                }
                (None, None) => bail!("Either --query or --update must be given"),
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .with_writer(std::io::stderr)
        .init();
}

fn read_sparql(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        stdin()
            .lock()
            .read_to_string(&mut buffer)
            .context("Could not read from stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

fn load_statistics(path: &Path) -> anyhow::Result<Weightings> {
    let file = File::open(path)
        .with_context(|| format!("Could not open the statistics file {}", path.display()))?;
    let mut graph = Graph::new();
    for triple in TurtleParser::new().for_reader(BufReader::new(file)) {
        let triple =
            triple.with_context(|| format!("The statistics file {} is invalid", path.display()))?;
        graph.insert(&triple);
    }
    info!(triples = graph.len(), path = %path.display(), "Loaded statistics");
    Weightings::from_graph(&graph)
        .with_context(|| format!("The statistics file {} is invalid", path.display()))
}

fn explain_query(
    pipeline: &OptimiserPipeline,
    query: &str,
    base: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let query = parse_query(query, base, pipeline.query_optimiser())
        .context("The SPARQL query is invalid")?;
    debug!(query_type = ?query.query_type(), "Parsed query");
    let optimised = pipeline.optimise_query(&query);

    writeln!(out, "Original algebra:")?;
    writeln!(out, "{}", query.to_algebra())?;
    writeln!(out)?;
    writeln!(out, "Optimised algebra:")?;
    writeln!(out, "{optimised}")?;
    Ok(())
}

fn explain_update(
    pipeline: &OptimiserPipeline,
    update: &str,
    base: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let update = parse_update(update, base, pipeline.query_optimiser())
        .context("The SPARQL update is invalid")?;
    let optimised = pipeline.optimise_update(&update);

    for (index, (original, optimised)) in update
        .commands()
        .iter()
        .zip(optimised.commands())
        .enumerate()
    {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "Command {}: {}",
            index + 1,
            command_name(original.command_type())
        )?;
        if let (Some(original), Some(optimised)) = (original.pattern(), optimised.pattern()) {
            writeln!(out, "Original algebra:")?;
            writeln!(out, "{original}")?;
            writeln!(out, "Optimised algebra:")?;
            writeln!(out, "{optimised}")?;
        }
    }
    Ok(())
}

fn command_name(command_type: UpdateCommandType) -> &'static str {
    match command_type {
        UpdateCommandType::InsertData => "INSERT DATA",
        UpdateCommandType::DeleteData => "DELETE DATA",
        UpdateCommandType::Modify => "DELETE/INSERT",
        UpdateCommandType::Load => "LOAD",
        UpdateCommandType::Clear => "CLEAR",
        UpdateCommandType::Create => "CREATE",
        UpdateCommandType::Drop => "DROP",
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::NamedTempFile;
    use predicates::prelude::*;

    fn cli_command() -> Command {
        let mut command = Command::new(env!("CARGO"));
        command
            .arg("run")
            .arg("--quiet")
            .arg("--bin")
            .arg("rdf-rewrite")
            .arg("--");
        command
    }

    #[test]
    fn cli_help() {
        cli_command()
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("rdf-rewrite"));
    }

    #[test]
    fn cli_explain_query_from_stdin() {
        cli_command()
            .arg("explain")
            .arg("--query")
            .arg("-")
            .write_stdin("SELECT ?s ?type WHERE { ?s a ?type } LIMIT 5")
            .assert()
            .success()
            .stdout(predicate::str::contains("Original algebra:"))
            .stdout(predicate::str::contains(
                "LazyBgp(5): ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?type",
            ));
    }

    #[test]
    fn cli_explain_with_statistics() -> Result<()> {
        let statistics = NamedTempFile::new("statistics.ttl")?;
        statistics.write_str(
            "@prefix opt: <http://rdf-rewrite.org/ns/optimiserStats#> .\n\
             <http://example.com/p1> opt:predicateCount 1000 .\n\
             <http://example.com/p2> opt:predicateCount 1 .\n",
        )?;
        let query = NamedTempFile::new("query.rq")?;
        query.write_str(
            "SELECT ?a WHERE { ?a <http://example.com/p1> ?x . ?x <http://example.com/p2> \"literal\" }",
        )?;

        cli_command()
            .arg("explain")
            .arg("--query")
            .arg(query.path())
            .arg("--statistics")
            .arg(statistics.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Bgp: ?x <http://example.com/p2> \"literal\" . ?a <http://example.com/p1> ?x",
            ));
        Ok(())
    }

    #[test]
    fn cli_rejects_invalid_statistics() -> Result<()> {
        let statistics = NamedTempFile::new("statistics.ttl")?;
        statistics.write_str(
            "@prefix opt: <http://rdf-rewrite.org/ns/optimiserStats#> .\n\
             <http://example.com/s> opt:count <http://example.com/o> .\n",
        )?;

        cli_command()
            .arg("explain")
            .arg("--query")
            .arg("-")
            .arg("--statistics")
            .arg(statistics.path())
            .write_stdin("SELECT * WHERE { ?s ?p ?o }")
            .assert()
            .failure()
            .stderr(predicate::str::contains("must be a literal"));
        Ok(())
    }

    #[test]
    fn cli_rejects_unknown_optimiser() {
        cli_command()
            .arg("explain")
            .arg("--query")
            .arg("-")
            .arg("--without")
            .arg("unknown")
            .write_stdin("SELECT * WHERE { ?s ?p ?o }")
            .assert()
            .failure()
            .stderr(predicate::str::contains("There is no optimiser called 'unknown'"));
    }

    #[test]
    fn cli_explain_update() -> Result<()> {
        let update = NamedTempFile::new("update.ru")?;
        update.write_str(
            "INSERT DATA { <http://example.com/s> <http://example.com/p> <http://example.com/o> } ;\n\
             DELETE { ?s ?p ?o } WHERE { ?s ?p ?o }",
        )?;

        cli_command()
            .arg("explain")
            .arg("--update")
            .arg(update.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Command 1: INSERT DATA"))
            .stdout(predicate::str::contains("Command 2: DELETE/INSERT"))
            .stdout(predicate::str::contains("Bgp: ?s ?p ?o"));
        Ok(())
    }

    #[test]
    fn command_names_use_sparql_keywords() {
        assert_eq!(command_name(UpdateCommandType::Modify), "DELETE/INSERT");
        assert_eq!(command_name(UpdateCommandType::Clear), "CLEAR");
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
