//! Rendering of [`Value`]s into their canonical text.
//!
//! Rendering is total: every value produces some text, and the same value
//! rendered twice in the same format produces the same bytes.

use crate::{
    value::{Field, Map},
    Format, Value,
};
use std::fmt::Write;

/// Renders values for one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    format: Format,
}

impl Renderer {
    pub fn new(format: Format) -> Self {
        Renderer { format }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn render(&self, value: &Value<'_>) -> String {
        let mut buf = String::with_capacity(32);
        self.write_value(&mut buf, value);
        buf
    }

    pub(crate) fn write_value(&self, buf: &mut String, value: &Value<'_>) {
        match value {
            Value::Loggable(v) => self.write_value(buf, &v.log_value()),
            Value::Display(v) => write_quoted(buf, &v.to_string()),
            Value::Error(err) => write_quoted(buf, &err.to_string()),
            Value::Null => buf.push_str("null"),
            Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
            Value::I64(n) => {
                let _ = write!(buf, "{}", n);
            }
            Value::U64(n) => {
                let _ = write!(buf, "{}", n);
            }
            Value::I128(n) => {
                let _ = write!(buf, "{}", n);
            }
            Value::U128(n) => {
                let _ = write!(buf, "{}", n);
            }
            Value::F32(n) => buf.push_str(&format_f32(*n)),
            Value::F64(n) => buf.push_str(&format_f64(*n)),
            Value::Complex64(re, im) => {
                write_quoted(buf, &format_complex(&format_f32(*re), &format_f32(*im)))
            }
            Value::Complex128(re, im) => {
                write_quoted(buf, &format_complex(&format_f64(*re), &format_f64(*im)))
            }
            Value::Str(s) => write_quoted(buf, s),
            Value::Seq(items) => {
                buf.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        buf.push(',');
                    }
                    self.write_value(buf, item);
                }
                buf.push(']');
            }
            Value::Present(v) => self.write_value(buf, v),
            Value::Map(map) => self.write_map(buf, map),
            Value::Struct(fields) => {
                buf.push('{');
                self.write_fields(buf, fields, &mut true);
                buf.push('}');
            }
            Value::TextKey(v) => write_quoted(buf, &marshal_text(*v)),
            Value::Unsupported(kind) => {
                let _ = write!(buf, "\"[{}]\"", kind);
            }
        }
    }

    fn write_fields(&self, buf: &mut String, fields: &[Field<'_>], first: &mut bool) {
        for field in fields {
            if field.is_skipped() {
                continue;
            }
            if field.omits_empty() && field.value().is_empty() {
                continue;
            }
            if field.is_inlined() && self.splice(buf, field.value(), first) {
                continue;
            }

            if !*first {
                buf.push(',');
            }
            *first = false;

            write_quoted(buf, field.name());
            buf.push(':');
            self.write_value(buf, field.value());
        }
    }

    /// Writes the fields of an embedded struct at the parent's level.
    /// Returns false when `value` does not resolve to a struct.
    fn splice(&self, buf: &mut String, value: &Value<'_>, first: &mut bool) -> bool {
        match value {
            Value::Struct(fields) => {
                self.write_fields(buf, fields, first);
                true
            }
            Value::Loggable(v) => self.splice(buf, &v.log_value(), first),
            Value::Present(v) => self.splice(buf, v, first),
            _ => false,
        }
    }

    fn write_map(&self, buf: &mut String, map: &Map<'_>) {
        buf.push('{');
        for (i, (key, value)) in map.entries().iter().enumerate() {
            if i > 0 {
                buf.push(',');
            }
            match key {
                Value::TextKey(k) => write_quoted(buf, &marshal_text(*k)),
                _ if map.string_keys() => self.write_value(buf, key),
                _ => write_quoted(buf, &self.render(key)),
            }
            buf.push(':');
            self.write_value(buf, value);
        }
        buf.push('}');
    }
}

/// Renders `value` in `format`.
pub fn render(value: &Value<'_>, format: Format) -> String {
    Renderer::new(format).render(value)
}

/// Quotes `s`, escaping it only when it holds a quote, a backslash or a
/// non-printable character.
pub fn quote(s: &str) -> String {
    let mut buf = String::with_capacity(s.len() + 2);
    write_quoted(&mut buf, s);
    buf
}

pub(crate) fn write_quoted(buf: &mut String, s: &str) {
    buf.push('"');
    if needs_escape(s) {
        for c in s.chars() {
            match c {
                '"' => buf.push_str("\\\""),
                '\\' => buf.push_str("\\\\"),
                '\n' => buf.push_str("\\n"),
                '\r' => buf.push_str("\\r"),
                '\t' => buf.push_str("\\t"),
                '\u{8}' => buf.push_str("\\b"),
                '\u{c}' => buf.push_str("\\f"),
                c if is_print(c) => buf.push(c),
                c => {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        let _ = write!(buf, "\\u{:04x}", unit);
                    }
                }
            }
        }
    } else {
        buf.push_str(s);
    }
    buf.push('"');
}

fn needs_escape(s: &str) -> bool {
    s.chars().any(|c| c == '"' || c == '\\' || !is_print(c))
}

// space is the only printable whitespace
fn is_print(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_control() || c.is_whitespace() || is_format(c) || is_private_or_noncharacter(c))
}

fn is_format(c: char) -> bool {
    matches!(c, '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}')
}

fn is_private_or_noncharacter(c: char) -> bool {
    let c = c as u32;
    matches!(c, 0xe000..=0xf8ff | 0xf0000..=0x10ffff | 0xfdd0..=0xfdef) || c & 0xfffe == 0xfffe
}

fn marshal_text(v: &dyn crate::MarshalText) -> String {
    match v.marshal_text() {
        Ok(text) => text,
        Err(err) => format!("<error-MarshalText: {}>", err),
    }
}

fn format_f64(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "+Inf" } else { "-Inf" }.to_owned();
    }
    n.to_string()
}

fn format_f32(n: f32) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "+Inf" } else { "-Inf" }.to_owned();
    }
    n.to_string()
}

fn format_complex(re: &str, im: &str) -> String {
    let sign = if im.starts_with('+') || im.starts_with('-') {
        ""
    } else {
        "+"
    };
    format!("({}{}{}i)", re, sign, im)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldOpts, Loggable, MarshalError, MarshalText, ToValue};
    use std::{
        collections::{BTreeMap, HashMap},
        error::Error,
        fmt, io,
    };

    fn json(value: &Value<'_>) -> String {
        render(value, Format::Json)
    }

    #[test]
    fn escapes_json_strings() {
        assert_eq!(
            "\"\\\"\\n\\t\"",
            quote(
                r#""
	"#
            )
        );
    }

    #[test]
    fn quotes_plain_strings_verbatim() {
        assert_eq!("\"plain\"", json(&"plain".to_value()));
        assert_eq!("\"héllo wörld\"", json(&"héllo wörld".to_value()));
        assert_eq!("\"a\\\"b\"", json(&"a\"b".to_value()));
        assert_eq!("\"a\\\\b\"", json(&"a\\b".to_value()));
        assert_eq!("\"zero\\u200bwidth\"", json(&"zero\u{200b}width".to_value()));
        assert_eq!("\"bell\\u0007\"", json(&"bell\u{7}".to_value()));
        assert_eq!("\"pua\\ue000\"", json(&"pua\u{e000}".to_value()));
        assert_eq!("\"nc\\ufffe\"", json(&"nc\u{fffe}".to_value()));
        assert_eq!("\"\\udb80\\udc00\"", json(&"\u{f0000}".to_value()));
    }

    #[test]
    fn renders_primitives() {
        for format in [Format::Json, Format::KeyValue] {
            assert_eq!("true", render(&true.to_value(), format));
            assert_eq!("false", render(&false.to_value(), format));
            assert_eq!("-5", render(&(-5i64).to_value(), format));
            assert_eq!("3.5", render(&3.5f64.to_value(), format));
        }
        assert_eq!("255", json(&255u8.to_value()));
        assert_eq!("-170141183460469231731687303715884105728", json(&i128::MIN.to_value()));
        assert_eq!("18446744073709551615", json(&u64::MAX.to_value()));
        assert_eq!("\"x\"", json(&'x'.to_value()));
    }

    #[test]
    fn renders_floats_at_their_own_width() {
        assert_eq!("0.1", json(&0.1f32.to_value()));
        assert_eq!("0.1", json(&0.1f64.to_value()));
        assert_eq!("1", json(&1.0f64.to_value()));
        assert_eq!("100000000000000000000", json(&1e20f64.to_value()));
        assert_eq!("0.000001", json(&1e-6f64.to_value()));
        assert_eq!("+Inf", json(&f64::INFINITY.to_value()));
        assert_eq!("-Inf", json(&f32::NEG_INFINITY.to_value()));
        assert_eq!("NaN", json(&f64::NAN.to_value()));
    }

    #[test]
    fn renders_complex_numbers_as_strings() {
        assert_eq!("\"(1+2i)\"", json(&Value::complex128(1.0, 2.0)));
        assert_eq!("\"(1.5-0.25i)\"", json(&Value::complex64(1.5, -0.25)));
        assert_eq!("\"(0+Infi)\"", json(&Value::complex128(0.0, f64::INFINITY)));
    }

    #[test]
    fn renders_absent_references_as_null() {
        let none: Option<&str> = None;
        for format in [Format::Json, Format::KeyValue] {
            assert_eq!("null", render(&none.to_value(), format));
            assert_eq!("null", render(&().to_value(), format));
        }
        let nested: Option<Box<Option<u8>>> = Some(Box::new(Some(7)));
        assert_eq!("7", json(&nested.to_value()));
    }

    #[test]
    fn renders_sequences_in_order() {
        assert_eq!("[3,1,2]", json(&vec![3, 1, 2].to_value()));
        assert_eq!("[]", json(&Vec::<u8>::new().to_value()));
        assert_eq!("[\"a\",null]", json(&[Some("a"), None].to_value()));
    }

    #[test]
    fn renders_maps() {
        let mut names = BTreeMap::new();
        names.insert("b", 2);
        names.insert("a", 1);
        assert_eq!("{\"a\":1,\"b\":2}", json(&names.to_value()));

        let mut ids = BTreeMap::new();
        ids.insert(1u32, "one");
        ids.insert(2u32, "two");
        assert_eq!("{\"1\":\"one\",\"2\":\"two\"}", json(&ids.to_value()));

        let mut single = HashMap::new();
        single.insert(-3i8, true);
        assert_eq!("{\"-3\":true}", json(&single.to_value()));
    }

    #[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
    struct Region(&'static str, bool);

    impl MarshalText for Region {
        fn marshal_text(&self) -> Result<String, MarshalError> {
            if self.1 {
                Ok(self.0.to_ascii_uppercase())
            } else {
                Err(format!("unknown region {}", self.0).into())
            }
        }
    }

    impl ToValue for Region {
        fn to_value(&self) -> Value<'_> {
            Value::text_key(self)
        }
    }

    #[test]
    fn map_keys_use_text_marshaling() {
        let mut map = BTreeMap::new();
        map.insert(0, Region("eu", true));
        let good = Region("eu", true);
        let bad = Region("mars", false);
        let mut by_region = crate::value::Map::new(false);
        by_region.insert(good.to_value(), Value::I64(1));
        by_region.insert(bad.to_value(), Value::I64(2));

        assert_eq!(
            "{\"EU\":1,\"<error-MarshalText: unknown region mars>\":2}",
            json(&Value::Map(by_region))
        );
        assert_eq!("{\"0\":\"EU\"}", json(&map.to_value()));
    }

    #[test]
    fn std_map_keys_use_text_marshaling() {
        let mut by_region = BTreeMap::new();
        by_region.insert(Region("eu", true), 1);
        by_region.insert(Region("mars", false), 2);
        for format in [Format::Json, Format::KeyValue] {
            assert_eq!(
                "{\"EU\":1,\"<error-MarshalText: unknown region mars>\":2}",
                render(&by_region.to_value(), format)
            );
        }

        let mut hashed = HashMap::new();
        hashed.insert(Region("us", true), "west");
        assert_eq!("{\"US\":\"west\"}", json(&hashed.to_value()));
    }

    struct Point {
        x: i32,
        y: i32,
    }

    impl Loggable for Point {
        fn log_value(&self) -> Value<'_> {
            Value::record().field("x", &self.x).field("y", &self.y).build()
        }
    }

    impl ToValue for Point {
        fn to_value(&self) -> Value<'_> {
            Value::loggable(self)
        }
    }

    struct Empty {
        a: i32,
        b: String,
    }

    impl Loggable for Empty {
        fn log_value(&self) -> Value<'_> {
            Value::record()
                .field("A", &self.a)
                .field_with("B", &self.b, FieldOpts::new().rename("b").omit_empty())
                .build()
        }
    }

    #[test]
    fn omits_empty_fields() {
        let empty = Empty {
            a: 0,
            b: String::new(),
        };
        assert_eq!("{\"A\":0}", json(&Value::loggable(&empty)));

        let full = Empty {
            a: 1,
            b: "x".into(),
        };
        assert_eq!("{\"A\":1,\"b\":\"x\"}", json(&Value::loggable(&full)));
    }

    #[test]
    fn present_options_are_never_empty() {
        let port = Some(0u16);
        let name: Option<&str> = Some("");
        let proxy: Option<&str> = None;
        let value = Value::record()
            .field_with("port", &port, FieldOpts::new().omit_empty())
            .field_with("name", &name, FieldOpts::new().omit_empty())
            .field_with("proxy", &proxy, FieldOpts::new().omit_empty())
            .build();
        assert_eq!("{\"port\":0,\"name\":\"\"}", json(&value));
    }

    #[test]
    fn embedded_options_splice_their_struct() {
        let origin = Some(Point { x: 3, y: 4 });
        let value = Value::record().embed("Point", &origin).field("n", &1).build();
        assert_eq!("{\"x\":3,\"y\":4,\"n\":1}", json(&value));
    }

    struct Shape {
        origin: Point,
        name: &'static str,
        secret: &'static str,
        tags: Vec<&'static str>,
    }

    impl Loggable for Shape {
        fn log_value(&self) -> Value<'_> {
            Value::record()
                .embed("Point", &self.origin)
                .field("name", &self.name)
                .field_with("secret", &self.secret, FieldOpts::new().skip())
                .field_with("tags", &self.tags, FieldOpts::new().omit_empty())
                .build()
        }
    }

    #[test]
    fn splices_embedded_structs() {
        let shape = Shape {
            origin: Point { x: 1, y: 2 },
            name: "sq",
            secret: "hunter2",
            tags: vec![],
        };
        assert_eq!("{\"x\":1,\"y\":2,\"name\":\"sq\"}", json(&Value::loggable(&shape)));
    }

    #[test]
    fn nests_renamed_embedded_structs() {
        let origin = Point { x: 1, y: 2 };
        let value = Value::record()
            .field_with("Point", &origin, FieldOpts::new().embedded().rename("at"))
            .build();
        assert_eq!("{\"at\":{\"x\":1,\"y\":2}}", json(&value));
    }

    #[test]
    fn embedded_non_structs_keep_their_name() {
        let value = Value::record().embed("Count", &3).build();
        assert_eq!("{\"Count\":3}", json(&value));
    }

    #[test]
    fn leading_skipped_fields_leave_no_separator() {
        let value = Value::record()
            .field_with("a", &0, FieldOpts::new().omit_empty())
            .field("b", &1)
            .build();
        assert_eq!("{\"b\":1}", json(&value));
    }

    struct Celsius(f64);

    impl fmt::Display for Celsius {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}°C", self.0)
        }
    }

    #[test]
    fn renders_capabilities() {
        assert_eq!("\"21.5°C\"", json(&Value::display(&Celsius(21.5))));

        let err = io::Error::new(io::ErrorKind::Other, "disk \"full\"");
        assert_eq!("\"disk \\\"full\\\"\"", json(&err.to_value()));

        let boxed: Box<dyn Error + Send + Sync> = "boxed".into();
        assert_eq!("\"boxed\"", json(&boxed.to_value()));

        assert_eq!("{\"x\":1,\"y\":2}", json(&Point { x: 1, y: 2 }.to_value()));
    }

    struct Alias;

    impl Loggable for Alias {
        fn log_value(&self) -> Value<'_> {
            Value::display(&"aliased")
        }
    }

    #[test]
    fn loggable_resolution_restarts() {
        assert_eq!("\"aliased\"", json(&Value::loggable(&Alias)));
    }

    #[test]
    fn unsupported_kinds_render_placeholders() {
        let (tx, rx) = std::sync::mpsc::channel::<u8>();
        let ptr: *const u8 = std::ptr::null();
        assert_eq!("\"[chan]\"", json(&tx.to_value()));
        assert_eq!("\"[chan]\"", json(&rx.to_value()));
        assert_eq!("\"[ptr]\"", json(&ptr.to_value()));
        assert_eq!("\"[func]\"", json(&Value::unsupported("func")));
    }

    #[test]
    fn rendering_is_idempotent() {
        let shape = Shape {
            origin: Point { x: -1, y: 0 },
            name: "line\n",
            secret: "",
            tags: vec!["a", "b"],
        };
        let value = Value::loggable(&shape);
        for format in [Format::Json, Format::KeyValue] {
            assert_eq!(render(&value, format), render(&value, format));
        }
    }

    #[test]
    fn renders_json_values() {
        let doc = serde_json::json!({"id": 7, "ok": true, "tags": ["x"], "ratio": 0.5});
        let rendered = json(&doc.to_value());
        assert!(rendered.starts_with('{') && rendered.ends_with('}'));
        for part in ["\"id\":7", "\"ok\":true", "\"tags\":[\"x\"]", "\"ratio\":0.5"] {
            assert!(rendered.contains(part), "{} missing from {}", part, rendered);
        }
    }
}
