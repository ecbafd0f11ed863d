//! The value model every logged field is converted into before rendering.
//!
//! Application types reach the renderer in one of three ways:
//!
//! * a [`ToValue`] implementation, which is the per-type conversion used by the
//!   [`kv!`](crate::kv) macro and by containers for their elements
//! * one of the capability wrappers, [`Value::loggable`], [`Value::display`],
//!   [`Value::error`] or [`Value::text_key`]
//! * [`Value::serde`], which walks any `serde::Serialize` type

use crate::{render, Format};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    error::Error as StdError,
    fmt,
    hash::BuildHasher,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    rc::Rc,
    sync::{mpsc, Arc},
    time::Duration,
};

/// Error returned by a failing [`MarshalText`] implementation.
pub type MarshalError = Box<dyn StdError + Send + Sync>;

/// A type that substitutes an alternate representation of itself when
/// logged. The returned value is resolved again from the top, so it may in
/// turn be another `Loggable`.
pub trait Loggable {
    fn log_value(&self) -> Value<'_>;
}

/// A type that renders itself as text when used as a map key.
pub trait MarshalText {
    fn marshal_text(&self) -> Result<String, MarshalError>;
}

/// Conversion of a concrete type into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;

    /// Whether this type is a string type. Maps whose key type is not a
    /// string type have their rendered keys quoted.
    fn is_string_kind() -> bool {
        false
    }
}

/// A loggable value.
#[derive(Clone)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    I128(i128),
    U128(u128),
    F32(f32),
    F64(f64),
    Complex64(f32, f32),
    Complex128(f64, f64),
    Str(Cow<'a, str>),
    Seq(Vec<Value<'a>>),
    Map(Map<'a>),
    Struct(Vec<Field<'a>>),
    /// A present optional value. Renders as its referent but is never empty.
    Present(Box<Value<'a>>),
    Loggable(&'a dyn Loggable),
    Display(&'a dyn fmt::Display),
    Error(&'a (dyn StdError + 'a)),
    TextKey(&'a dyn MarshalText),
    /// A kind with no textual representation, named by the given string.
    Unsupported(&'static str),
}

impl<'a> Value<'a> {
    pub fn null() -> Value<'static> {
        Value::Null
    }

    pub fn str(s: impl Into<Cow<'a, str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn loggable<T: Loggable>(value: &'a T) -> Self {
        Value::Loggable(value)
    }

    pub fn display<T: fmt::Display>(value: &'a T) -> Self {
        Value::Display(value)
    }

    pub fn error<E: StdError>(err: &'a E) -> Self {
        Value::Error(err)
    }

    pub fn text_key<T: MarshalText>(value: &'a T) -> Self {
        Value::TextKey(value)
    }

    pub fn complex64(re: f32, im: f32) -> Self {
        Value::Complex64(re, im)
    }

    pub fn complex128(re: f64, im: f64) -> Self {
        Value::Complex128(re, im)
    }

    pub fn unsupported(kind: &'static str) -> Self {
        Value::Unsupported(kind)
    }

    /// Starts a struct-like value built field by field.
    pub fn record() -> Record<'a> {
        Record::new()
    }

    /// Empty per the omit-if-empty rule: zero-length strings and containers,
    /// `false`, numeric zero and null. Everything else, including a `Some`
    /// holding one of those, is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::I64(n) => *n == 0,
            Value::U64(n) => *n == 0,
            Value::I128(n) => *n == 0,
            Value::U128(n) => *n == 0,
            Value::F32(n) => *n == 0.0,
            Value::F64(n) => *n == 0.0,
            Value::Complex64(re, im) => *re == 0.0 && *im == 0.0,
            Value::Complex128(re, im) => *re == 0.0 && *im == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Struct(_)
            | Value::Present(_)
            | Value::Loggable(_)
            | Value::Display(_)
            | Value::Error(_)
            | Value::TextKey(_)
            | Value::Unsupported(_) => false,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::render(self, Format::Json))
    }
}

/// Entries of a map value, kept in insertion order.
#[derive(Clone, Default)]
pub struct Map<'a> {
    entries: Vec<(Value<'a>, Value<'a>)>,
    string_keys: bool,
}

impl<'a> Map<'a> {
    /// `string_keys` records whether the map's key type is a string type.
    pub fn new(string_keys: bool) -> Self {
        Map {
            entries: Vec::new(),
            string_keys,
        }
    }

    pub fn insert(&mut self, key: Value<'a>, value: Value<'a>) {
        self.entries.push((key, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn string_keys(&self) -> bool {
        self.string_keys
    }

    pub fn entries(&self) -> &[(Value<'a>, Value<'a>)] {
        &self.entries
    }
}

impl<'a> FromIterator<(Value<'a>, Value<'a>)> for Map<'a> {
    fn from_iter<I: IntoIterator<Item = (Value<'a>, Value<'a>)>>(iter: I) -> Self {
        let entries: Vec<_> = iter.into_iter().collect();
        let string_keys = entries.iter().all(|(k, _)| matches!(k, Value::Str(_)));
        Map {
            entries,
            string_keys,
        }
    }
}

/// Per-field annotations of a struct value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOpts<'a> {
    rename: Option<Cow<'a, str>>,
    skip: bool,
    omit_empty: bool,
    embedded: bool,
}

impl<'a> FieldOpts<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the field under `name` instead of its declared name. A renamed
    /// embedded field is nested under the new name rather than inlined.
    pub fn rename(mut self, name: impl Into<Cow<'a, str>>) -> Self {
        self.rename = Some(name.into());
        self
    }

    /// Never emit the field.
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Leave the field out when its value is empty.
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Inline the fields of a struct value into the parent.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// One field of a struct value.
#[derive(Clone)]
pub struct Field<'a> {
    name: Cow<'a, str>,
    value: Value<'a>,
    opts: FieldOpts<'a>,
}

impl<'a> Field<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, value: Value<'a>, opts: FieldOpts<'a>) -> Self {
        Field {
            name: name.into(),
            value,
            opts,
        }
    }

    /// Name the field is emitted under.
    pub fn name(&self) -> &str {
        self.opts.rename.as_deref().unwrap_or(&self.name)
    }

    pub fn value(&self) -> &Value<'a> {
        &self.value
    }

    pub fn is_skipped(&self) -> bool {
        self.opts.skip
    }

    pub fn omits_empty(&self) -> bool {
        self.opts.omit_empty
    }

    /// Whether the field's own fields splice into its parent.
    pub fn is_inlined(&self) -> bool {
        self.opts.embedded && self.opts.rename.is_none()
    }
}

/// Builder for struct values, usually returned from a [`Loggable`] impl.
///
/// ```
/// use kvline::{Loggable, FieldOpts, Value};
///
/// struct Conn { peer: String, retries: u32 }
///
/// impl Loggable for Conn {
///     fn log_value(&self) -> Value<'_> {
///         Value::record()
///             .field("peer", &self.peer)
///             .field_with("retries", &self.retries, FieldOpts::new().omit_empty())
///             .build()
///     }
/// }
/// ```
#[derive(Clone, Default)]
pub struct Record<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> Record<'a> {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    pub fn field<T: ToValue + ?Sized>(self, name: impl Into<Cow<'a, str>>, value: &'a T) -> Self {
        self.field_with(name, value, FieldOpts::new())
    }

    pub fn field_with<T: ToValue + ?Sized>(
        self,
        name: impl Into<Cow<'a, str>>,
        value: &'a T,
        opts: FieldOpts<'a>,
    ) -> Self {
        self.value_with(name, value.to_value(), opts)
    }

    /// Adds an anonymous field whose own fields are inlined.
    pub fn embed<T: ToValue + ?Sized>(self, name: impl Into<Cow<'a, str>>, value: &'a T) -> Self {
        self.field_with(name, value, FieldOpts::new().embedded())
    }

    /// Adds a field from an already converted value.
    pub fn value_with(
        mut self,
        name: impl Into<Cow<'a, str>>,
        value: Value<'a>,
        opts: FieldOpts<'a>,
    ) -> Self {
        self.fields.push(Field::new(name, value, opts));
        self
    }

    pub fn build(self) -> Value<'a> {
        Value::Struct(self.fields)
    }
}

impl<'v> ToValue for Value<'v> {
    fn to_value(&self) -> Value<'_> {
        self.clone()
    }
}

macro_rules! impl_to_value {
    ($variant:ident as $as:ty: $($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value<'_> {
                    Value::$variant(*self as $as)
                }
            }
        )*
    };
}

impl_to_value!(I64 as i64: i8, i16, i32, i64, isize);
impl_to_value!(U64 as u64: u8, u16, u32, u64, usize);
impl_to_value!(I128 as i128: i128);
impl_to_value!(U128 as u128: u128);
impl_to_value!(F32 as f32: f32);
impl_to_value!(F64 as f64: f64);

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Owned(self.to_string()))
    }

    fn is_string_kind() -> bool {
        true
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }

    fn is_string_kind() -> bool {
        true
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }

    fn is_string_kind() -> bool {
        true
    }
}

impl ToValue for Cow<'_, str> {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }

    fn is_string_kind() -> bool {
        true
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value<'_> {
        Value::Null
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }

    fn is_string_kind() -> bool {
        T::is_string_kind()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }

    fn is_string_kind() -> bool {
        T::is_string_kind()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }

    fn is_string_kind() -> bool {
        T::is_string_kind()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }

    fn is_string_kind() -> bool {
        T::is_string_kind()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(v) => Value::Present(Box::new(v.to_value())),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value<'_> {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value<'_> {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        self.as_slice().to_value()
    }
}

impl<K: ToValue, V: ToValue, S: BuildHasher> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value<'_> {
        let mut map = Map::new(K::is_string_kind());
        for (k, v) in self {
            map.insert(k.to_value(), v.to_value());
        }
        Value::Map(map)
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value<'_> {
        let mut map = Map::new(K::is_string_kind());
        for (k, v) in self {
            map.insert(k.to_value(), v.to_value());
        }
        Value::Map(map)
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value<'_> {
        use serde_json::Value as Json;

        match self {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(Cow::Borrowed(s)),
            Json::Array(items) => items.to_value(),
            Json::Object(obj) => {
                let mut map = Map::new(true);
                for (k, v) in obj {
                    map.insert(Value::Str(Cow::Borrowed(k)), v.to_value());
                }
                Value::Map(map)
            }
        }
    }
}

impl ToValue for dyn StdError + 'static {
    fn to_value(&self) -> Value<'_> {
        Value::Error(self)
    }
}

impl ToValue for dyn StdError + Send + Sync + 'static {
    fn to_value(&self) -> Value<'_> {
        Value::Error(self)
    }
}

impl ToValue for std::io::Error {
    fn to_value(&self) -> Value<'_> {
        Value::Error(self)
    }
}

macro_rules! impl_display_value {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value<'_> {
                    Value::Display(self)
                }
            }
        )*
    };
}

impl_display_value!(IpAddr, SocketAddr, chrono::NaiveDateTime);

impl<Tz: chrono::TimeZone> ToValue for chrono::DateTime<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn to_value(&self) -> Value<'_> {
        Value::Display(self)
    }
}

impl ToValue for Duration {
    fn to_value(&self) -> Value<'_> {
        Value::Str(Cow::Owned(format!("{:?}", self)))
    }
}

impl ToValue for Path {
    fn to_value(&self) -> Value<'_> {
        Value::Str(self.to_string_lossy())
    }
}

impl ToValue for PathBuf {
    fn to_value(&self) -> Value<'_> {
        self.as_path().to_value()
    }
}

impl<T: ?Sized> ToValue for *const T {
    fn to_value(&self) -> Value<'_> {
        Value::Unsupported("ptr")
    }
}

impl<T: ?Sized> ToValue for *mut T {
    fn to_value(&self) -> Value<'_> {
        Value::Unsupported("ptr")
    }
}

impl<T> ToValue for mpsc::Sender<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Unsupported("chan")
    }
}

impl<T> ToValue for mpsc::Receiver<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Unsupported("chan")
    }
}
