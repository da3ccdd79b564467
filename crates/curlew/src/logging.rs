//! Logging init: stderr subscriber with env-filter overrides.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging to stderr. `RUST_LOG` overrides the default
/// filter. Call once, from binaries or test harnesses embedding the client.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,curlew=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
