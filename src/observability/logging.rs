//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level from config, overridden by `RUST_LOG`
//! - Optional log file written through a non-blocking appender; the
//!   returned guard flushes it on drop and must live as long as `main`

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, ObservabilityConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log file path '{}' does not name a file", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot open log file '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: InitError,
    },
}

/// Install the global tracing subscriber.
///
/// Returns the file writer's guard when `log_file` is set.
pub fn init_logging(config: &ObservabilityConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let mut layers = vec![fmt_layer(config.log_format, std::io::stdout, true)];
    let guard = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            layers.push(fmt_layer(config.log_format, writer, false));
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry().with(layers).with(filter).init();
    Ok(guard)
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.boxed(),
    }
}

/// Append-only appender for `path`, creating missing directories.
fn file_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::NotAFile(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(dir)
        .map_err(|source| LoggingError::File {
            path: path.to_path_buf(),
            source,
        })
}

fn default_directive(level: &str) -> String {
    format!("polldancer={level},polldancer_sink={level},warn")
}
