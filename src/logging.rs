use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr subscriber. Unknown filter strings fall back to `info`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
