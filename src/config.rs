//! Tunable defaults shared by the core algorithms and the CLI drivers.

/// Default number of ascending-degree-of-freedom signatures DEFT uses to
/// build its constraint before falling back to unconstrained backtracking.
/// A performance hyperparameter, not a correctness one — see
/// [`crate::deft::is_exchangeable_deft`].
pub const DEFAULT_CUTOFF: usize = 5;

/// Default mixing probability for the `mixed` instance generator.
pub const DEFAULT_MIXED_P: f64 = 0.5;

/// Fixed seed used for the perturbation and argument-shuffle steps of
/// instance generation, matching the corpus's reproducibility requirement.
pub const DEFAULT_SEED: u64 = 123;

/// Default number of repeated timed calls the runner CLI averages over.
pub const DEFAULT_REPEATS: u32 = 5;
