use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// The handle for the file writer guard. Dropping it flushes and disables the
/// log file writer, thus it must be kept alive until the end of the program.
#[must_use]
pub struct LogGuard {
    #[allow(dead_code)]
    guard: Option<WorkerGuard>,
}

/// Installs global log collector.
///
/// Logs are always written to stdout. Filtering is configured with the
/// `RUST_LOG` environment variable and defaults to INFO.
///
/// # Arguments
///
/// * `dir` - if given, logs are additionally written to a new file in this
///   directory. The file is named after the current local time.
pub fn init(dir: Option<&Path>) -> Result<LogGuard> {
    let (file_layer, guard) = match dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(
                tracing_appender::rolling::never(dir, file_name()),
            );
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let collector = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                // defaults to INFO if RUST_LOG not set
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(file_layer);
    tracing::subscriber::set_global_default(collector)
        .context("Unable to set a global collector")?;

    Ok(LogGuard { guard })
}

fn file_name() -> PathBuf {
    let dt = chrono::Local::now();
    dt.format("%Y-%m-%d_%H-%M-%S.log").to_string().into()
}
