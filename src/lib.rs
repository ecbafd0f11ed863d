//! `kvline` is a structured line logger rendering application values either as
//! flat `"key"=value` pairs or as single line JSON objects.
//!
//! ```
//! use kvline::{kv, Format, Level, Logger};
//!
//! let logger = Logger::builder()
//!     .level(Level::Info)
//!     .name("svc")
//!     .format(Format::KeyValue)
//!     .build();
//!
//! // svc: "ts"="2024-03-09 14:05:26.000490" "msg"="started" "port"=8080
//! logger.info("started", &kv!["port", 8080]);
//! ```
//!
//! Fields are passed as an alternating key/value list. Keys that are not
//! strings are rendered and cut to 16 characters, and a trailing key without
//! a value gets `"[n/a]"`.
//!
//! Levels are matched exactly: a logger configured for `info` emits
//! [`Logger::info`] calls only, not `error` ones.
//!
//! The same rendering is available to the `log` facade through an
//! `env_logger` builder, see [`builder`] and [`format_builder`].
//!
//! ## features
//!
//! * `utc-timestamps`
//!
//! By default the `ts` field is taken from the local wall clock. Enabling this
//! feature uses UTC instead.
//!
//! ```toml
//! [dependencies]
//! kvline = { version = "0.1", features = ["utc-timestamps"] }
//! ```
//! * `backtrace`
//!
//! When registering a panic hook with `panic_hook` by default backtraces are omitted. You can
//! annotate your error with then by enabling the `backtrace` feature.
//!
//! ```toml
//! [dependencies]
//! kvline = { version = "0.1", features = ["backtrace"] }
//! ```

// export to make types accessible without
// requiring adding another Cargo.toml dependency
#[doc(hidden)]
pub extern crate env_logger;

pub mod compose;
mod env;
mod error;
mod level;
pub mod logger;
pub mod normalize;
pub mod render;
mod ser;
pub mod value;

pub use crate::{
    env::{format_builder, render_record},
    error::Error,
    level::{Format, Level},
    logger::{format_timestamp, Log, Logger, Target},
    render::{quote, render, Renderer},
    value::{FieldOpts, Loggable, MarshalError, MarshalText, Record, ToValue, Value},
};

use std::{any::Any, panic, thread};

/// Builds an alternating key/value list out of arbitrary [`ToValue`]
/// expressions, for use as the fields of a log call.
///
/// ```
/// use kvline::{kv, Value};
///
/// let fields: [Value; 4] = kv!["user", "ann", "attempts", 3];
/// ```
#[macro_export]
macro_rules! kv {
    ($($item:expr),* $(,)?) => {
        [$($crate::ToValue::to_value(&$item)),*]
    };
}

/// Register the JSON env logger implementation with `log` crate.
///
/// Applications should ensure this fn gets called once and only once per application
/// lifetime
///
/// # panics
///
/// Panics of logger has already been configured
pub fn init() {
    try_init().unwrap()
}

/// Register the JSON env logger with `log` crate
///
/// Will yield an `log::SetLoggerError` when a logger has already
/// been configured
pub fn try_init() -> Result<(), log::SetLoggerError> {
    builder().try_init()
}

/// Yields the standard env_logger builder configured to log in JSON format
pub fn builder() -> env_logger::Builder {
    format_builder(Format::Json)
}

/// Register a panic hook that logs panic information via `log::error`,
/// with `thread` and `location` fields
pub fn panic_hook() {
    panic::set_hook(Box::new(|info| {
        let thread = thread::current();
        let thread = thread.name().unwrap_or("unnamed");
        let msg = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_owned());

        #[cfg(not(feature = "backtrace"))]
        {
            kv_log_macro::error!(
                "panicked at '{}'", msg,
                {
                    thread: thread,
                    location: location
                }
            );
        }

        #[cfg(feature = "backtrace")]
        {
            kv_log_macro::error!(
                "panicked at '{}'", msg,
                {
                    thread: thread,
                    location: location,
                    backtrace: format!("{:?}", backtrace::Backtrace::new())
                }
            );
        }
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    match payload.downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match payload.downcast_ref::<String>() {
            Some(s) => s.as_str(),
            None => "Box<Any>",
        },
    }
}
