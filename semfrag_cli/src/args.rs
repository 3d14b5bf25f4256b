use std::path::PathBuf;

use clap::Parser;
use semfrag_common::{Config, MatchMode};

/// Semfrag - find the corpus sentences that contain a dependency fragment
#[derive(Parser, Debug)]
#[command(name = "semfrag")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Corpus of parsed sentences, one JSON record per line
    #[arg(short = 'c', long)]
    pub corpus: PathBuf,

    /// Fragments to search for, one JSON record per line
    #[arg(short = 'f', long)]
    pub fragments: PathBuf,

    /// JSON configuration file; the flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum search steps per fragment
    #[arg(long)]
    pub node_budget: Option<u64>,
    /// Keep only the first matching edge-set of each sentence
    #[arg(long, default_value_t = false)]
    pub first_only: bool,
    /// Disable parallel execution
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Also build feature statistics and print context-vector sizes
    #[arg(long, default_value_t = false)]
    pub features: bool,
}

impl Args {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
            None => Config::default(),
        };
        if self.node_budget.is_some() {
            config.node_budget = self.node_budget;
        }
        if self.first_only {
            config.match_mode = MatchMode::First;
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }
}
