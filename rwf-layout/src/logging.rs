//! Wrapper around `tracing_subscriber` for logging.
//!
//! Logs go to stderr at the `INFO` level, unless overridden with `RUST_LOG`.
//! Layout chain changes and the flash lifecycle are logged at `DEBUG`.
//!
//! If you prefer to use your own subscriber, don't initialize the `Logger`.
//!
//! ### Example
//!
//! ```rust
//! use rwf_layout::logging::Logger;
//!
//! Logger::init();
//! ```
use crate::config::get_config;
use once_cell::sync::OnceCell;
use tracing_subscriber::{filter::LevelFilter, fmt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

pub struct Logger;

impl Logger {
    /// Configure logging application-wide.
    ///
    /// Safe to call multiple times, the subscriber is installed once.
    pub fn init() {
        INITIALIZED.get_or_init(|| {
            setup_logging();
            get_config().log_info();
        });
    }
}

fn setup_logging() {
    let subscriber = fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(get_config().general.tty)
        .with_file(false)
        .with_target(false)
        .finish();

    // Another subscriber may already be installed, e.g. by the application.
    let _ = subscriber.try_init();
}
