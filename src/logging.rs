use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or info-level
/// engine events with `verbose`. Logs go to stderr so stdout stays clean for
/// JSON consumers.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "dep_graph=info" } else { "dep_graph=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
