use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "rdf-rewrite")]
/// RDF Rewrite command line toolkit for inspecting SPARQL algebra optimisations
pub struct Args {
    /// Logs the decisions of the optimisers
    ///
    /// The RUST_LOG environment variable takes precedence over this flag.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the algebra of a SPARQL query or update before and after optimisation
    Explain {
        /// File containing the SPARQL query
        ///
        /// If "-" is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath, required_unless_present = "update", conflicts_with = "update")]
        query: Option<PathBuf>,
        /// File containing the SPARQL update
        ///
        /// If "-" is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        update: Option<PathBuf>,
        /// Base IRI of the query or update
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// Turtle file with pattern statistics
        ///
        /// The statistics use the vocabulary <http://rdf-rewrite.org/ns/optimiserStats#> and
        /// replace the structural ordering of triple patterns.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        statistics: Option<PathBuf>,
        /// Substitute variables compared with `=` into object positions
        ///
        /// `=` compares literals by value, so the substitution may change the results of queries
        /// that compare literals.
        #[arg(long = "unsafe")]
        unsafe_optimisation: bool,
        /// Keep the triple patterns in the order in which they are written
        #[arg(long, conflicts_with = "statistics")]
        no_reorder: bool,
        /// Disable all algebra optimisers
        #[arg(long)]
        no_optimisation: bool,
        /// Remove the optimiser with the given name from the pipeline
        ///
        /// Can be given multiple times, e.g., `--without implicit_join --without lazy_bgp`.
        #[arg(long, value_name = "NAME")]
        without: Vec<String>,
        /// Mark variable-disjoint joins and unions for concurrent evaluation
        #[arg(long)]
        parallel: bool,
    },
}
