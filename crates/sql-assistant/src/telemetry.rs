// sql-assistant/crates/sql-assistant/src/telemetry.rs

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Install the global subscriber, writing to stderr so that answers on
/// stdout stay clean. Returns false when a subscriber was already installed.
pub fn init_tracing_with(default_filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}
