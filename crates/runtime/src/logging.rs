//! Tracing subscriber setup for hosts.

/// Installs the global tracing subscriber, filtered by `RUST_LOG` with an
/// `info` default. Safe to call once per process; hosts embedding their own
/// subscriber skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}
