use anyhow::Result;
use clap::Parser;

use docrank_cli::{init_tracing, run_retrieve, RetrieveArgs};
use docrank_core::config::Config;

/// Pick the best source document for every question.
#[derive(Debug, Parser)]
#[command(name = "docrank-retrieve", version)]
struct Cli {
    #[command(flatten)]
    args: RetrieveArgs,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Config::load()?.settings()?;
    let path = run_retrieve(&cli.args, settings)?;
    println!("{}", path.display());
    Ok(())
}
