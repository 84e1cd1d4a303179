//! Logging initialization
//!
//! Console output filtered through `RUST_LOG` (falling back to the configured
//! level), with optional rolling file output. The file writer guard is parked
//! in a process-wide static so the non-blocking writer survives until exit.

use std::sync::OnceLock;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::LoggingConfig;

static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes the global tracing subscriber.
///
/// Safe to call once per process; later calls fail when a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_to_file {
        let appender = tracing_appender::rolling::daily(&config.log_dir, "motorscout.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);

        if config.json_output {
            registry
                .with(fmt::layer().json())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
        } else {
            registry
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
        }
    } else if config.json_output {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    Ok(())
}
