use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use deft_exchange::config::{DEFAULT_MIXED_P, DEFAULT_SEED};
use deft_exchange::instance::{build_pair, instance_name, InstanceKind};
use deft_exchange::logging;

/// Generates one factor-pair instance file of the requested shape and writes
/// it under `--out-dir`, named per the corpus convention.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long)]
    n: usize,

    #[arg(long, value_enum)]
    r#type: InstanceTypeArg,

    /// Mixing probability, used only when `--type mixed`.
    #[arg(long, default_value_t = DEFAULT_MIXED_P)]
    p: f64,

    /// Whether the generated pair should be exchangeable. Absent means false
    /// (a perturbed, non-exchangeable pair).
    #[arg(long)]
    iseq: bool,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum InstanceTypeArg {
    Asc,
    Same,
    Mixed,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let kind = match args.r#type {
        InstanceTypeArg::Asc => InstanceKind::Asc,
        InstanceTypeArg::Same => InstanceKind::Same,
        InstanceTypeArg::Mixed => InstanceKind::Mixed { p: args.p },
    };

    let instance = build_pair(args.n, args.iseq, kind, args.seed);
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let filename = format!("{}.bin", instance_name(args.n, args.iseq, kind));
    let path = args.out_dir.join(&filename);
    deft_exchange::instance::save(&instance, &path)
        .with_context(|| format!("writing instance to {}", path.display()))?;

    log::info!("wrote {}", path.display());
    Ok(())
}
