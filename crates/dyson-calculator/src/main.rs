//! `dyson`: run one Dyson-equation step from the command line.
//!
//! Usage: `dyson --param <file> --input <archive> --output <archive> [--order <n>]`

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use dyson_calculator::{run, Parameter};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dyson", about = "Assemble Dyson-equation terms from bare G and W")]
struct Cli {
    /// JSON parameter file
    #[arg(long)]
    param: PathBuf,

    /// Archive holding the bare G and W
    #[arg(long)]
    input: PathBuf,

    /// Archive the results are appended to
    #[arg(long)]
    output: PathBuf,

    /// Expansion order, overriding the parameter file
    #[arg(long)]
    order: Option<usize>,
}

fn execute(cli: &Cli) -> Result<()> {
    let mut parameter = Parameter::load(&cli.param)?;
    if let Some(order) = cli.order {
        parameter.order = order;
        parameter.validate()?;
    }
    run(&parameter, &cli.input, &cli.output)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = execute(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}
