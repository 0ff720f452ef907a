use std::fmt;
use std::str::FromStr;

use crate::config::DEFAULT_CUTOFF;
use crate::deft::is_exchangeable_deft;
use crate::error::AlgorithmParseError;
use crate::factor::Factor;
use crate::permutation::{is_exchangeable_filter, is_exchangeable_naive};

/// The three algorithms this crate compares. Dispatched by name from the
/// CLI; an unrecognised name is a typed [`AlgorithmParseError`], not a
/// silent fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Algorithm {
    Naive,
    Filter,
    Deft,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Algorithm::Naive => "naive",
            Algorithm::Filter => "filter",
            Algorithm::Deft => "deft",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Algorithm {
    type Err = AlgorithmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(Algorithm::Naive),
            "filter" => Ok(Algorithm::Filter),
            "deft" => Ok(Algorithm::Deft),
            other => Err(AlgorithmParseError::Unknown(other.to_string())),
        }
    }
}

/// The single façade entry point: dispatches to naive, filter, or DEFT
/// (with the default cutoff) and returns whether `f1` and `f2` are
/// exchangeable. Inputs are borrowed read-only; each algorithm owns its own
/// working deep copies internally.
pub fn is_exchangeable(algo: Algorithm, f1: &Factor, f2: &Factor) -> bool {
    match algo {
        Algorithm::Naive => is_exchangeable_naive(f1, f2),
        Algorithm::Filter => is_exchangeable_filter(f1, f2),
        Algorithm::Deft => is_exchangeable_deft(f1, f2, DEFAULT_CUTOFF),
    }
}
