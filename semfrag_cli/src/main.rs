//! Semfrag command-line tool.
//!
//! Loads a corpus of parsed sentences, runs every fragment of a fragment file
//! against it, and prints the sentences each fragment occurs in.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use clap::Parser;
use semfrag_common::{GraphSource, JsonLinesReader, ParsedSentence};
use semfrag_subgraph::{Corpus, FeatureStats, FragmentMatchService, FragmentOutcome};
use tracing::{info, warn};

use args::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let config = args.to_config()?;

    info!("Loading corpus: {}", args.corpus.display());
    let mut builder = Corpus::builder();
    let ingested = builder.ingest(&mut JsonLinesReader::open(&args.corpus)?);
    if !ingested.errors.is_empty() {
        warn!("{} corpus records skipped", ingested.errors.len());
    }
    let corpus = builder.build();

    let fragments = read_fragments(&args)?;
    info!("Executing {} fragment queries", fragments.len());

    let service = FragmentMatchService::new(&corpus, config.clone());
    let batch = service.query_batch(&fragments)?;

    let stats = if args.features {
        let stats = FeatureStats::build(&corpus, &config)?;
        println!("{} distinct features", stats.len());
        Some(stats)
    } else {
        None
    };

    for report in &batch.reports {
        match &report.outcome {
            FragmentOutcome::Matched(matches) => {
                println!("{}: {} sentences", report.fragment, matches.len());
                for m in matches {
                    let text = corpus.sentence_text(m.sentence).unwrap_or("?");
                    println!("  {} ({} edge-sets)", text, m.edge_sets.len());
                }
            }
            FragmentOutcome::Alien { label } => {
                println!("{}: alien ({label})", report.fragment);
            }
            FragmentOutcome::Failed { error } => {
                println!("{}: failed ({error})", report.fragment);
            }
            FragmentOutcome::Aborted { partial, steps } => {
                println!(
                    "{}: aborted after {steps} steps, {} sentences so far",
                    report.fragment,
                    partial.len()
                );
            }
        }
        if let Some(stats) = &stats {
            let vector = stats.vector_for(&corpus, report.outcome.matches())?;
            println!("  context vector: {} features", vector.len());
        }
    }

    Ok(())
}

fn read_fragments(args: &Args) -> Result<Vec<ParsedSentence>, Box<dyn std::error::Error>> {
    let mut reader = JsonLinesReader::open(&args.fragments)?;
    let mut fragments = Vec::new();
    while reader.has_next() {
        match reader.next_sentence() {
            Ok(parsed) => fragments.push(parsed),
            Err(e) => warn!("skipping fragment record: {e}"),
        }
    }
    Ok(fragments)
}
