use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use deft_exchange::logging;
use deft_exchange::report::{aggregate, read_rows, write_aggregate};

/// Reads a results CSV (`instance,n,iseq,type,algo,time`), aggregates
/// min/max/mean/median/std per `(n, iseq, type, algo)` group, and writes the
/// aggregate CSV. Groups containing a `timeout` row are dropped entirely.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    results: PathBuf,
    out: PathBuf,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let rows = read_rows(&args.results)
        .with_context(|| format!("reading results from {}", args.results.display()))?;
    let aggregated = aggregate(&rows);
    write_aggregate(&aggregated, &args.out)
        .with_context(|| format!("writing aggregate to {}", args.out.display()))?;

    log::info!(
        "aggregated {} rows into {} groups",
        rows.len(),
        aggregated.len()
    );
    Ok(())
}
