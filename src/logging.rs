//! Logging setup for hosts that embed the library.

use tracing_subscriber::EnvFilter;

/// Filter used when neither an explicit filter nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "info";

/// Installs a global `tracing` subscriber writing to stderr.
///
/// `filter` takes the usual `EnvFilter` directives (e.g.
/// `"recipe_finder=debug"`). When it is `None`, `RUST_LOG` is used, then
/// `info`. Calling this more than once is harmless; only the first call
/// installs a subscriber. Returns whether this call installed it.
pub fn init(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
