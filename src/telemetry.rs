use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PAYOFF_LOG=payoff=debug`.
pub const LOG_ENV: &str = "PAYOFF_LOG";

/// Installs the process-wide fmt subscriber. Logs go to stderr so CLI output stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
