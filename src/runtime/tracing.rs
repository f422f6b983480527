/// Initializes structured logging for the service.
///
/// Output verbosity is controlled through the `RUST_LOG` environment
/// variable:
/// - `RUST_LOG=info` - startup, shutdown, and every state change
/// - `RUST_LOG=debug` - plus per-request detail (lookups, skipped writes)
/// - `RUST_LOG=orders_service=debug` - debug only for this crate
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
