//! Subscriber installation for the bmodal binary.
//!
//! The library logs through `log`; those records reach this subscriber via
//! the `tracing-log` bridge that `init()` installs. Loading overlays emit a
//! trace line on every anchor resync and status change, so lines matching a
//! configured pattern are dropped after formatting.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use bmodal::config::LoggingConfig;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{Format, Full, Writer};
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Where formatted lines go.
enum Sink {
    File(PathBuf, File),
    Stderr,
}

impl Sink {
    /// The configured log file, or stderr when there is none or it cannot be
    /// created.
    fn open(config: &LoggingConfig) -> Self {
        let Some(path) = config.log_file.clone() else {
            return Self::Stderr;
        };
        match File::create(&path) {
            Ok(file) => Self::File(path, file),
            Err(err) => {
                eprintln!("Cannot create {}: {err}; logging to stderr", path.display());
                Self::Stderr
            }
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Stderr)
    }

    fn into_writer(self) -> BoxMakeWriter {
        match self {
            Self::File(path, file) => {
                eprintln!("Logging to {}", path.display());
                BoxMakeWriter::new(Mutex::new(file))
            }
            Self::Stderr => BoxMakeWriter::new(io::stderr),
        }
    }
}

/// Formats like the default full formatter, then drops lines that contain a
/// muted pattern.
struct MutingFormat {
    inner: Format<Full, SystemTime>,
    muted: Vec<String>,
}

impl MutingFormat {
    fn new(muted: Vec<String>, ansi: bool) -> Self {
        Self {
            inner: fmt::format().with_target(false).with_ansi(ansi),
            muted,
        }
    }

    fn mutes(&self, line: &str) -> bool {
        self.muted.iter().any(|pattern| line.contains(pattern.as_str()))
    }
}

impl<S, N> FormatEvent<S, N> for MutingFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut line = String::new();
        self.inner.format_event(ctx, Writer::new(&mut line), event)?;
        if self.mutes(&line) {
            return Ok(());
        }
        writer.write_str(&line)
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let sink = Sink::open(config);
    let format = MutingFormat::new(config.suppressed_patterns.clone(), sink.is_terminal());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(sink.into_writer())
                .event_format(format),
        )
        .init();
}
