//! Global tracing subscriber for the command line binary

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Filter directive used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Filter directive used by `--quiet`
pub const QUIET_FILTER: &str = "warn";

/// Install the fmt subscriber once per process
///
/// Honours `RUST_LOG`, falling back to `default_filter`. Output goes to stderr so it does
/// not interleave with progress bars. Returns `false` when a subscriber was already set.
pub fn init_tracing(default_filter: &str) -> bool {
    if INITIALISED.set(()).is_err() {
        return false;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
