use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use deft_exchange::algorithm::{is_exchangeable, Algorithm};
use deft_exchange::config::DEFAULT_REPEATS;
use deft_exchange::instance::load;
use deft_exchange::logging;

/// Loads an instance file, times `--repeats` calls to the requested
/// algorithm (each against a fresh deep copy), and prints a single line
/// `MEAN_TIME_NS,ISEQ_BOOL` to stdout. Nothing else is written to stdout;
/// errors go to stderr with a non-zero exit. The 1800s wall-clock timeout
/// named in the external interface is the outer driver's responsibility —
/// this binary never imposes one of its own.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    path: PathBuf,
    algo: Algorithm,

    #[arg(long, default_value_t = DEFAULT_REPEATS)]
    repeats: u32,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let instance = load(&args.path)
        .with_context(|| format!("loading instance {}", args.path.display()))?;

    let mut total_ns: u128 = 0;
    let mut iseq = false;
    for _ in 0..args.repeats.max(1) {
        let start = Instant::now();
        iseq = is_exchangeable(args.algo, &instance.f1, &instance.f2);
        total_ns += start.elapsed().as_nanos();
    }
    let mean_ns = total_ns / u128::from(args.repeats.max(1));

    println!("{},{}", mean_ns, iseq);
    Ok(())
}
