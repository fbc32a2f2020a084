//! Logging setup.
//!
//! `RUST_LOG` wins when set. Otherwise `DEBUG_MODE` picks between info and
//! debug for our own crates; dependencies stay at info.

use tracing_subscriber::EnvFilter;

pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "info,maintainer_core=debug,registry_maintainer=debug"
    } else {
        "info"
    }
}

pub fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
