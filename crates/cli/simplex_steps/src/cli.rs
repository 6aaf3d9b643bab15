//! CLI argument definitions for the simplex step replayer.

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "simplex-steps",
    version,
    about = "Replay a simplex derivation step by step in exact arithmetic",
    long_about = "Replay a simplex derivation step by step in exact arithmetic.\n\n\
                  Loads a linear program (or a saved derivation), applies the\n\
                  transform history and prints every intermediate tableau."
)]
pub struct Cli {
    /// Linear program or derivation JSON file (the sample problem when omitted).
    #[arg(long, value_name = "FILE")]
    pub problem: Option<PathBuf>,

    /// JSON array of transforms appended to the history of `--problem`.
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Also print the tableaus of collapsed steps.
    #[arg(long = "show-collapsed")]
    pub show_collapsed: bool,

    /// Print step labels and flags as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}
