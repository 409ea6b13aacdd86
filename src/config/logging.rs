use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber for a binary.
///
/// `RUST_LOG` overrides `default_directive`; log lines go to stderr so that
/// stdout stays reserved for user-facing output.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
