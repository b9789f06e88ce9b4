// src/bin/fudge-graph.rs
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use fudge_graph::rules;
use fudge_graph::serialize;
use fudge_graph::{downward, is_projective, simplify_coordination, upward};
use fudge_graph::{Graph, GraphRecord};

#[derive(Parser)]
#[command(name = "fudge-graph")]
#[command(about = "Candidate inference over underspecified dependency annotations")]
struct Cli {
    /// JSON annotation record to analyze
    input: PathBuf,

    /// Print extracted head-chain rules instead of the candidate report
    #[arg(long)]
    rules: bool,

    /// Emit the simplified graph as a JSON record
    #[arg(long)]
    json: bool,

    /// Suppress the per-node candidate report
    #[arg(long, short)]
    quiet: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let record = GraphRecord::from_path(&cli.input)
        .with_context(|| format!("failed to load record {}", cli.input.display()))?;
    let mut graph = Graph::from_record(&record).context("failed to build graph")?;

    simplify_coordination(&mut graph).context("failed to simplify coordination")?;
    upward(&mut graph).context("upward candidate pass failed")?;
    downward(&mut graph).context("downward candidate pass failed")?;

    if cli.rules {
        for rule in rules::extract(&graph) {
            println!("{rule}");
        }
        return Ok(());
    }
    if cli.json {
        let record = serialize::to_record(&graph);
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    if !cli.quiet {
        report(&graph);
    }

    if is_projective(&graph) {
        println!("{}", "projective".green().bold());
    } else {
        println!("{}", "non-projective".red().bold());
    }
    Ok(())
}

fn report(graph: &Graph) {
    for &id in graph.active() {
        if graph.node(id).is_bundle() {
            if let Some(tops) = graph.top_candidates(id) {
                println!(
                    "{} {} {}",
                    graph.display_name(id).cyan(),
                    "tops:".bold(),
                    names(graph, tops.iter().copied())
                );
            }
        }
        if let Some(parents) = graph.parent_candidates(id) {
            println!(
                "{} {} {}",
                graph.display_name(id).cyan(),
                "parents:".bold(),
                names(graph, parents.iter().copied())
            );
        }
    }
}

fn names(graph: &Graph, ids: impl Iterator<Item = fudge_graph::NodeId>) -> String {
    let mut out: Vec<String> = ids.map(|n| graph.display_name(n)).collect();
    out.sort();
    out.join(" ")
}
