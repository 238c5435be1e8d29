//! Structured logging setup.
//!
//! Scheduled, unattended runs want machine-readable JSON on disk; a person
//! poking at a store wants pretty console output. Both come from the same
//! `tracing` pipeline, selected through the `logging` section of the
//! configuration (or the `LOG_*` environment variables).

use crate::config::get_config;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Initialize the logging system from configuration.
///
/// The returned guard must stay alive for the duration of the process when
/// file output is enabled, or buffered log lines are lost on exit.
pub fn init_logging() -> Option<WorkerGuard> {
    let config = get_config();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let json = config.logging.format.eq_ignore_ascii_case("json");
    let registry = tracing_subscriber::registry().with(filter);

    let (to_console, to_file) = match config.logging.output.as_str() {
        "file" => (false, true),
        "both" => (true, true),
        _ => (true, false),
    };

    if !to_file {
        registry.with(console_layer(json)).init();
        return None;
    }

    let _ = std::fs::create_dir_all(&config.logging.directory);
    let appender = tracing_appender::rolling::daily(&config.logging.directory, "glam-usage.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    if to_console {
        registry
            .with(console_layer(json))
            .with(file_layer(json, writer))
            .init();
    } else {
        registry.with(file_layer(json, writer)).init();
    }
    Some(guard)
}

fn console_layer<S>(json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_ansi(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    }
}

fn file_layer<S>(json: bool, writer: NonBlocking) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if json {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(true)
            .with_span_list(true)
            .boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(false).boxed()
    }
}
