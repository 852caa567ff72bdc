use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "anthro_etl=info";

/// Initializes console logging.
///
/// Structured events go to stderr; the level is taken from `RUST_LOG` and
/// falls back to `info` for this crate.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second initialization (e.g. from tests) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
