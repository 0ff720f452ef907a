pub mod algorithm;
pub mod buckets;
pub mod config;
pub mod deft;
pub mod error;
pub mod factor;
pub mod instance;
pub mod logging;
pub mod permutation;
pub mod report;
