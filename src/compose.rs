//! Assembly of a full log line from its field groups.

use crate::{
    normalize::{normalize, KeyValue},
    render::{write_quoted, Renderer},
    Format, Value,
};

/// Composes one line out of the implicit fields, the pre-rendered bound
/// fields and the call-site fields, in that order.
///
/// Implicit keys are trusted and written as bare quoted literals. Call-site
/// keys are escaped when needed. `bound` is inserted verbatim.
pub fn compose(implicit: &[Value<'_>], bound: &str, fields: &[Value<'_>], format: Format) -> String {
    let renderer = Renderer::new(format);
    let mut buf = String::with_capacity(256);

    if format.is_json() {
        buf.push('{');
    }

    let mut preceded = write_pairs(&renderer, &mut buf, &normalize(&renderer, implicit), false, false);

    if !bound.is_empty() {
        if preceded {
            buf.push(format.separator());
        }
        buf.push_str(bound);
        preceded = true;
    }

    write_pairs(&renderer, &mut buf, &normalize(&renderer, fields), preceded, true);

    if format.is_json() {
        buf.push('}');
    }

    buf
}

/// Renders `fields` into a bound-fields string for [`compose`], appending
/// them to an already rendered `existing` string.
pub fn bind(existing: &str, fields: &[Value<'_>], format: Format) -> String {
    let renderer = Renderer::new(format);
    let mut buf = String::with_capacity(existing.len() + 64);
    buf.push_str(existing);
    write_pairs(
        &renderer,
        &mut buf,
        &normalize(&renderer, fields),
        !existing.is_empty(),
        false,
    );
    buf
}

/// Prefixes a flat line with `"<name>: "`. JSON lines carry the name as a
/// `logger` field instead and are returned unchanged.
pub fn prefix(name: &str, line: String, format: Format) -> String {
    if format.is_json() || name.is_empty() {
        return line;
    }
    let mut prefixed = String::with_capacity(name.len() + 2 + line.len());
    prefixed.push_str(name);
    prefixed.push_str(": ");
    prefixed.push_str(&line);
    prefixed
}

// returns whether anything has been written so far
fn write_pairs(
    renderer: &Renderer,
    buf: &mut String,
    pairs: &[KeyValue<'_>],
    mut preceded: bool,
    escape_keys: bool,
) -> bool {
    let format = renderer.format();
    for kv in pairs {
        if preceded {
            buf.push(format.separator());
        }
        preceded = true;

        if escape_keys {
            write_quoted(buf, &kv.key);
        } else {
            buf.push('"');
            buf.push_str(&kv.key);
            buf.push('"');
        }
        buf.push(format.delimiter());
        renderer.write_value(buf, &kv.value);
    }
    preceded
}
