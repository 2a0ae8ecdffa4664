use tracing::Level;

/// Initialize the global tracing subscriber with a plain fmt layer.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
