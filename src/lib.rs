pub mod config;
pub mod models;
pub mod store;
pub mod trend;

pub use models::{RawObservation, SessionDetail, TrendPoint, TrendSeries};
pub use trend::{are_equivalent, build_trend, char_canonical, word_canonical};

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` wins over the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
