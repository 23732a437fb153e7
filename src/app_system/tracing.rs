use tracing_subscriber::EnvFilter;

/// Configure tracing once at startup for the whole process.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Output is the
/// compact formatter with an uptime timer, so each line shows how long the
/// process has been running. Later calls are no-ops.
///
/// ```bash
/// RUST_LOG=debug cargo run
/// RUST_LOG=sweetshop_engine::store=debug,info cargo run
/// ```
pub fn setup_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init();
}
