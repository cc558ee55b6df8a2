//! Tracing setup.
//!
//! Diagnostics go to stderr so tables on stdout survive piping; the filter
//! comes from `RUST_LOG` and defaults to silence.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
