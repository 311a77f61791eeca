use std::path::Path;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

pub const LOG_FILE_NAME: &str = "queue-after.log";

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Keep the returned guard alive or buffered file output is lost.
pub fn init(config: &LogConfig, dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow!("invalid log level {:?}: {}", config.level, e))?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    if config.file {
        let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()?;
        Ok(Some(guard))
    } else {
        registry.try_init()?;
        Ok(None)
    }
}
