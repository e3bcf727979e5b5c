use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Filter comes from `RENOTRACK_LOG`,
/// defaulting to warnings only. Output goes to stderr.
pub(crate) fn init() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("RENOTRACK_LOG")
            .unwrap_or_else(|_| EnvFilter::new("renotrack=warn"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
