//! Correlates SNP genotype columns with behavioral lifestyle codes.
//!
//! Reads a subject table (workbook or delimited file), one-hot encodes every
//! variant column, tests each indicator against the behavioral codes and
//! writes the significant associations as a table, a JSON summary and a
//! heatmap.

mod cli;
mod config;
mod encoding;
mod filter;
mod io;
mod pipeline;
mod preprocess;
mod stats;
mod table;
mod visualization;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::debug;

use cli::{run_cli, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
    debug!("Parsed arguments: {:?}", cli);

    run_cli(cli)
}
