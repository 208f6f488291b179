//! Run logger
//!
//! [`RunLog`] is a `tracing` layer that renders every event as
//! `[<timestamp>] [LOG|ERR] <message>` on stdout. `ERROR` events are also
//! appended to the optional log file. A disabled `RunLog` writes nothing
//! anywhere.

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use std::{
    fmt::{self, Write as _},
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{
    Event, Level, Metadata, Subscriber,
    field::{Field, Visit},
    subscriber::Interest,
};
use tracing_subscriber::layer::{Context, Layer};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Log,
    Err,
}

impl Severity {
    fn tag(self) -> &'static str {
        match self {
            Severity::Log => "LOG",
            Severity::Err => "ERR",
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        if level == Level::ERROR {
            Severity::Err
        } else {
            Severity::Log
        }
    }
}

pub fn format_line(ts: &NaiveDateTime, severity: Severity, msg: &str) -> String {
    format!("[{}] [{}] {msg}", ts.format(TIMESTAMP_FORMAT), severity.tag())
}

/// Append one line to `path`, creating the file if needed.
pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{line}")
}

/*──────── layer ────────*/

pub struct RunLog {
    enabled: bool,
    file: Option<PathBuf>,
    stdout: Mutex<Box<dyn Write + Send>>,
}

impl RunLog {
    pub fn new(enabled: bool, file: Option<PathBuf>) -> Self {
        Self {
            enabled,
            file,
            stdout: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Replace the stdout sink.
    pub fn with_writer(mut self, w: impl Write + Send + 'static) -> Self {
        self.stdout = Mutex::new(Box::new(w));
        self
    }

    fn emit(&self, severity: Severity, msg: &str) {
        let line = format_line(&Local::now().naive_local(), severity, msg);
        {
            let mut out = self.stdout.lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
        if severity == Severity::Err {
            if let Some(path) = &self.file {
                // write failures are ignored
                let _ = append_line(path, &line);
            }
        }
    }
}

impl<S: Subscriber> Layer<S> for RunLog {
    fn register_callsite(&self, _meta: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, _meta: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.enabled
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.enabled {
            return;
        }
        let mut msg = MessageVisitor::default();
        event.record(&mut msg);
        self.emit(Severity::from(*event.metadata().level()), &msg.finish());
    }
}

/// Collects `message` plus any extra fields as ` key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    extra: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        self.message + &self.extra
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.extra, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.extra, " {}={value:?}", field.name());
        }
    }
}
