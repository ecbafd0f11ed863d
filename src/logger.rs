//! The [`Logger`] façade and its [`Builder`].

use crate::{
    compose::{bind, compose, prefix},
    Error, Format, Level, Value,
};
use chrono::NaiveDateTime;
use std::{
    env,
    error::Error as StdError,
    fmt,
    io::{self, Write},
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
};

/// Environment variable read by [`Builder::from_env`] for the level.
pub const LEVEL_ENV: &str = "KVLINE_LEVEL";
/// Environment variable read by [`Builder::from_env`] for the format.
pub const FORMAT_ENV: &str = "KVLINE_FORMAT";
/// Environment variable read by [`Builder::from_env`] for the name.
pub const NAME_ENV: &str = "KVLINE_NAME";

/// `strftime` pattern of the `ts` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Source of the `ts` field.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Formats `ts` as `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn system_clock() -> NaiveDateTime {
    #[cfg(feature = "utc-timestamps")]
    {
        chrono::Utc::now().naive_utc()
    }
    #[cfg(not(feature = "utc-timestamps"))]
    {
        chrono::Local::now().naive_local()
    }
}

/// Where lines are written.
pub enum Target {
    Stdout,
    Stderr,
    Pipe(Box<dyn Write + Send + 'static>),
}

impl Default for Target {
    fn default() -> Self {
        Target::Stdout
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Stdout => "Stdout",
            Target::Stderr => "Stderr",
            Target::Pipe(_) => "Pipe(_)",
        })
    }
}

impl Target {
    fn into_sink(self) -> Sink {
        let writer: Box<dyn Write + Send> = match self {
            Target::Stdout => Box::new(io::stdout()),
            Target::Stderr => Box::new(io::stderr()),
            Target::Pipe(pipe) => pipe,
        };
        Arc::new(Mutex::new(writer))
    }
}

/// Configures and builds a [`Logger`].
///
/// ```
/// use kvline::{Format, Level, Logger};
///
/// let logger = Logger::builder()
///     .level(Level::Info)
///     .name("svc")
///     .format(Format::Json)
///     .build();
/// assert!(logger.enabled(Level::Info));
/// ```
#[derive(Default)]
pub struct Builder {
    level: Level,
    name: String,
    format: Format,
    target: Target,
    clock: Option<Clock>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder initialized from [`LEVEL_ENV`], [`FORMAT_ENV`] and
    /// [`NAME_ENV`]. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, Error> {
        let mut builder = Builder::new();
        if let Some(level) = read_env(LEVEL_ENV)? {
            builder.level(level.parse()?);
        }
        if let Some(format) = read_env(FORMAT_ENV)? {
            builder.format(format.parse()?);
        }
        if let Some(name) = read_env(NAME_ENV)? {
            builder.name(name);
        }
        Ok(builder)
    }

    pub fn level(&mut self, level: Level) -> &mut Self {
        self.level = level;
        self
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    pub fn target(&mut self, target: Target) -> &mut Self {
        self.target = target;
        self
    }

    /// Replaces the wall clock used for the `ts` field.
    pub fn clock<F>(&mut self, clock: F) -> &mut Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        let clock: Clock = Arc::new(clock);
        self.clock = Some(clock);
        self
    }

    /// Builds the logger. The target is moved into the logger and the builder
    /// falls back to stdout.
    pub fn build(&mut self) -> Logger {
        let clock: Clock = match &self.clock {
            Some(clock) => Arc::clone(clock),
            None => Arc::new(system_clock),
        };
        Logger {
            level: AtomicU8::new(self.level as u8),
            name: self.name.clone(),
            format: self.format,
            bound: String::new(),
            sink: std::mem::take(&mut self.target).into_sink(),
            clock,
        }
    }
}

fn read_env(var: &str) -> Result<Option<String>, Error> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(Error::Env {
            var: var.to_owned(),
            source,
        }),
    }
}

/// The operations of a structured logger, for code that takes any logger
/// rather than the concrete [`Logger`].
pub trait Log {
    fn enabled(&self, level: Level) -> bool;
    fn set_level(&self, level: Level);
    fn debug(&self, msg: &str, fields: &[Value<'_>]);
    fn info(&self, msg: &str, fields: &[Value<'_>]);
    fn error(&self, err: Option<&dyn StdError>, msg: &str, fields: &[Value<'_>]);
}

/// A structured line logger.
///
/// Every emitting call renders one line and writes it, newline terminated,
/// to the logger's target. Write failures are dropped. A logger may be shared
/// between threads; the level is the only state that changes after
/// construction.
pub struct Logger {
    level: AtomicU8,
    name: String,
    format: Format,
    bound: String,
    sink: Sink,
    clock: Clock,
}

impl Logger {
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Whether this logger emits calls made at `level`. Only the exact
    /// configured level is enabled.
    pub fn enabled(&self, level: Level) -> bool {
        self.level() == level
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns a logger that adds `fields` to every line after the implicit
    /// fields. It shares this logger's target and clock and starts at its
    /// current level.
    pub fn with_values(&self, fields: &[Value<'_>]) -> Logger {
        Logger {
            bound: bind(&self.bound, fields, self.format),
            ..self.clone()
        }
    }

    pub fn debug(&self, msg: &str, fields: &[Value<'_>]) {
        if self.enabled(Level::Debug) {
            self.write(self.format_debug(msg, fields));
        }
    }

    pub fn info(&self, msg: &str, fields: &[Value<'_>]) {
        if self.enabled(Level::Info) {
            self.write(self.format_info(msg, fields));
        }
    }

    pub fn error(&self, err: Option<&dyn StdError>, msg: &str, fields: &[Value<'_>]) {
        if self.enabled(Level::Error) {
            self.write(self.format_error(err, msg, fields));
        }
    }

    /// The line [`debug`](Self::debug) would write, without the newline.
    pub fn format_debug(&self, msg: &str, fields: &[Value<'_>]) -> String {
        self.line(msg, None, fields)
    }

    /// The line [`info`](Self::info) would write, without the newline.
    pub fn format_info(&self, msg: &str, fields: &[Value<'_>]) -> String {
        self.line(msg, None, fields)
    }

    /// The line [`error`](Self::error) would write, without the newline.
    pub fn format_error(
        &self,
        err: Option<&dyn StdError>,
        msg: &str,
        fields: &[Value<'_>],
    ) -> String {
        self.line(msg, Some(err), fields)
    }

    fn line(
        &self,
        msg: &str,
        err: Option<Option<&dyn StdError>>,
        fields: &[Value<'_>],
    ) -> String {
        let ts = format_timestamp(&(self.clock)());
        let mut implicit = Vec::with_capacity(8);
        if self.format.is_json() {
            implicit.push(Value::str("logger"));
            implicit.push(Value::str(self.name.as_str()));
        }
        implicit.push(Value::str("ts"));
        implicit.push(Value::str(ts.as_str()));
        implicit.push(Value::str("msg"));
        implicit.push(Value::str(msg));
        if let Some(err) = err {
            implicit.push(Value::str("error"));
            implicit.push(err.map_or(Value::Null, Value::Error));
        }

        let line = compose(&implicit, &self.bound, fields, self.format);
        prefix(&self.name, line, self.format)
    }

    fn write(&self, mut line: String) {
        line.push('\n');
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = sink.write_all(line.as_bytes()).and_then(|_| sink.flush());
    }
}

impl Log for Logger {
    fn enabled(&self, level: Level) -> bool {
        Logger::enabled(self, level)
    }

    fn set_level(&self, level: Level) {
        Logger::set_level(self, level)
    }

    fn debug(&self, msg: &str, fields: &[Value<'_>]) {
        Logger::debug(self, msg, fields)
    }

    fn info(&self, msg: &str, fields: &[Value<'_>]) {
        Logger::info(self, msg, fields)
    }

    fn error(&self, err: Option<&dyn StdError>, msg: &str, fields: &[Value<'_>]) {
        Logger::error(self, err, msg, fields)
    }
}

impl Clone for Logger {
    fn clone(&self) -> Self {
        Logger {
            level: AtomicU8::new(self.level.load(Ordering::Relaxed)),
            name: self.name.clone(),
            format: self.format,
            bound: self.bound.clone(),
            sink: Arc::clone(&self.sink),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("name", &self.name)
            .field("format", &self.format)
            .field("bound", &self.bound)
            .finish()
    }
}
