use std::{env, fmt};

/// Errors produced while configuring a logger.
///
/// Logging calls themselves never fail: these only surface from parsing
/// levels and formats or reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A level string outside of `none`, `debug`, `info`, `error`, `all`.
    #[error("unknown log level `{0}`, expected one of none, debug, info, error, all")]
    UnknownLevel(String),

    /// A format string outside of `keyvalue`, `json`.
    #[error("unknown log format `{0}`, expected one of keyvalue, json")]
    UnknownFormat(String),

    /// An environment variable was set but could not be read.
    #[error("unable to read environment variable `{var}`")]
    Env {
        var: String,
        #[source]
        source: env::VarError,
    },

    /// A `serde::Serialize` implementation reported a failure.
    #[error("{0}")]
    Serialize(String),
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Serialize(msg.to_string())
    }
}
