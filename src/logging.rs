use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AGENTDESK_LOG";

/// Installs the global stderr subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
