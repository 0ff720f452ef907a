use thiserror::Error;

/// Errors crossing the instance-file and results-CSV boundaries. The
/// algorithm core (`factor`, `buckets`, `permutation`, `deft`, `algorithm`)
/// never returns `Result` — every decision it makes is total and
/// deterministic, per the specification's error-handling design. These
/// variants only occur in the driver layer: reading/writing files,
/// (de)serializing, and parsing CLI input.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize instance: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("failed to read/write results row: {0}")]
    Csv(#[from] csv::Error),
}

/// Parsing an unrecognised algorithm name is a programmer/input error, not
/// a data error — it is rejected before any factor is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlgorithmParseError {
    #[error("unknown algorithm name: {0:?} (expected one of naive, filter, deft)")]
    Unknown(String),
}
