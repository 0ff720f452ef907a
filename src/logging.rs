use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes `env_logger` exactly once per process, honoring `RUST_LOG`.
/// Safe to call from every CLI binary's `main` as well as from tests.
///
/// The core (`factor`, `buckets`, `permutation`, `deft`, `algorithm`) logs
/// only at `debug`/`trace` level — it never writes to stdout, which the
/// runner CLI reserves for the `MEAN_TIME_NS,ISEQ_BOOL` contract.
pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::try_init();
    });
}
