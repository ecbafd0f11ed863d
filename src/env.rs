//! Bridge between the `log` facade and the line renderer.
//!
//! Records emitted through `log` (or `kv_log_macro` for structured fields)
//! are rendered with the same composer as [`Logger`](crate::Logger). Level
//! filtering is left to `env_logger` and its `RUST_LOG` variable.

use crate::{
    compose::{compose, prefix},
    logger::{format_timestamp, system_clock},
    Format, Value,
};
use env_logger::Builder;
use log::kv;
use std::{borrow::Cow, io::Write};

/// Yields the standard env_logger builder configured to log in `format`
pub fn format_builder(format: Format) -> Builder {
    let mut builder = Builder::from_default_env();
    builder.format(move |f, record| {
        let ts = format_timestamp(&system_clock());
        writeln!(f, "{}", render_record(record, format, &ts))
    });
    builder
}

/// Renders a `log` record. Implicit fields are `logger` (JSON only), `ts`,
/// `level` and `msg`; flat lines are prefixed with the record's target.
pub fn render_record(record: &log::Record<'_>, format: Format, ts: &str) -> String {
    let msg = record.args().to_string();
    let level = record.level().to_string();

    let mut implicit = Vec::with_capacity(8);
    if format.is_json() {
        implicit.push(Value::str("logger"));
        implicit.push(Value::str(record.target()));
    }
    implicit.push(Value::str("ts"));
    implicit.push(Value::str(ts));
    implicit.push(Value::str("level"));
    implicit.push(Value::str(level.as_str()));
    implicit.push(Value::str("msg"));
    implicit.push(Value::str(msg.as_str()));

    let mut visitor = Visitor { fields: Vec::new() };
    let _ = record.key_values().visit(&mut visitor);

    let line = compose(&implicit, "", &visitor.fields, format);
    prefix(record.target(), line, format)
}

struct Visitor {
    fields: Vec<Value<'static>>,
}

impl<'kvs> kv::Visitor<'kvs> for Visitor {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, val: kv::Value<'kvs>) -> Result<(), kv::Error> {
        self.fields
            .push(Value::Str(Cow::Owned(key.as_str().to_owned())));
        self.fields.push(from_kv(&val));
        Ok(())
    }
}

fn from_kv(val: &kv::Value<'_>) -> Value<'static> {
    if let Some(b) = val.to_bool() {
        Value::Bool(b)
    } else if let Some(n) = val.to_u64() {
        Value::U64(n)
    } else if let Some(n) = val.to_i64() {
        Value::I64(n)
    } else if let Some(n) = val.to_f64() {
        Value::F64(n)
    } else if let Some(c) = val.to_char() {
        Value::Str(Cow::Owned(c.to_string()))
    } else if let Some(s) = val.to_borrowed_str() {
        Value::Str(Cow::Owned(s.to_owned()))
    } else {
        Value::Str(Cow::Owned(val.to_string()))
    }
}
