use crate::Error;
use std::{fmt, str::FromStr};

/// Log level a [`Logger`](crate::Logger) is configured with, and that each
/// call is tagged with.
///
/// Levels are *not* ordered by severity. A logger answers `enabled` only for
/// the exact level it is configured with, so a `debug` logger emits debug
/// lines and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Level {
    None = 0,
    Debug = 1,
    Info = 2,
    Error = 3,
    All = 4,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::None => "none",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Error => "error",
            Level::All => "all",
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Level {
        match raw {
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Error,
            4 => Level::All,
            _ => Level::None,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Level::None),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "error" => Ok(Level::Error),
            "all" => Ok(Level::All),
            _ => Err(Error::UnknownLevel(s.to_owned())),
        }
    }
}

/// Output format of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Space separated `"key"=value` pairs.
    KeyValue,
    /// A single line `{"key":value,...}` object.
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::KeyValue => "keyvalue",
            Format::Json => "json",
        }
    }

    pub fn is_json(&self) -> bool {
        *self == Format::Json
    }

    /// Separator written between two fields.
    pub(crate) fn separator(&self) -> char {
        match self {
            Format::KeyValue => ' ',
            Format::Json => ',',
        }
    }

    /// Delimiter written between a key and its value.
    pub(crate) fn delimiter(&self) -> char {
        match self {
            Format::KeyValue => '=',
            Format::Json => ':',
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::KeyValue
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyvalue" => Ok(Format::KeyValue),
            "json" => Ok(Format::Json),
            _ => Err(Error::UnknownFormat(s.to_owned())),
        }
    }
}
