//! Pairing of alternating key/value lists.

use crate::{render::Renderer, Value};
use std::borrow::Cow;

/// Value given to a trailing key that has no counterpart.
pub const NO_VALUE: &str = "[n/a]";

/// Longest key, in characters, produced from a non-string key.
pub const MAX_KEY_LEN: usize = 16;

/// A key and its value after normalization.
#[derive(Clone, Debug)]
pub struct KeyValue<'a> {
    pub key: Cow<'a, str>,
    pub value: Value<'a>,
}

/// Pairs up an alternating `key, value, key, value, ..` list.
///
/// String keys are kept as they are. Any other key is rendered and cut to
/// [`MAX_KEY_LEN`] characters. An odd-length list gets [`NO_VALUE`] as its
/// last value. Nothing is ever dropped.
pub fn normalize<'a>(renderer: &Renderer, items: &[Value<'a>]) -> Vec<KeyValue<'a>> {
    items
        .chunks(2)
        .map(|pair| {
            let key = match &pair[0] {
                Value::Str(s) => s.clone(),
                other => Cow::Owned(truncate(renderer.render(other))),
            };
            let value = match pair.get(1) {
                Some(v) => v.clone(),
                None => Value::Str(Cow::Borrowed(NO_VALUE)),
            };
            KeyValue { key, value }
        })
        .collect()
}

fn truncate(mut s: String) -> String {
    if let Some((idx, _)) = s.char_indices().nth(MAX_KEY_LEN) {
        s.truncate(idx);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, Format, ToValue};

    fn pairs<'a>(items: &[Value<'a>]) -> Vec<KeyValue<'a>> {
        normalize(&Renderer::new(Format::Json), items)
    }

    #[test]
    fn pads_odd_lists_with_sentinel() {
        let items = [Value::str("a"), Value::I64(1), Value::str("dangling")];
        let kvs = pairs(&items);
        assert_eq!(2, kvs.len());
        assert_eq!("dangling", kvs[1].key);
        assert_eq!("\"[n/a]\"", render(&kvs[1].value, Format::Json));
    }

    #[test]
    fn even_lists_pass_through() {
        let items = [Value::str("a"), Value::I64(1), Value::str("b"), Value::Bool(true)];
        let kvs = pairs(&items);
        assert_eq!(
            vec!["a", "b"],
            kvs.iter().map(|kv| &*kv.key).collect::<Vec<&str>>()
        );
        assert_eq!("true", render(&kvs[1].value, Format::Json));
    }

    #[test]
    fn renders_non_string_keys() {
        let items = [Value::I64(42), Value::str("answer")];
        assert_eq!("42", pairs(&items)[0].key);

        let items = [Value::Bool(false)];
        let kvs = pairs(&items);
        assert_eq!("false", kvs[0].key);
        assert_eq!("\"[n/a]\"", render(&kvs[0].value, Format::Json));
    }

    #[test]
    fn truncates_long_non_string_keys() {
        let key = vec![1000, 2000, 3000, 4000, 5000];
        let items = [key.to_value(), Value::I64(0)];
        let kvs = pairs(&items);
        let rendered = render(&key.to_value(), Format::Json);
        assert_eq!(&rendered[..MAX_KEY_LEN], kvs[0].key);
        assert_eq!("[1000,2000,3000,", kvs[0].key);
    }

    #[test]
    fn truncates_by_characters() {
        let display = "ééééééééééééééééééé";
        let items = [Value::display(&display), Value::Null];
        let key = pairs(&items).remove(0).key;
        assert_eq!(MAX_KEY_LEN, key.chars().count());
        assert!(key.starts_with("\"ééé"));
    }

    #[test]
    fn string_keys_are_never_truncated() {
        let long = "a_really_long_key_name_that_goes_on";
        let items = [Value::str(long), Value::Null];
        assert_eq!(long, pairs(&items)[0].key);
    }

    #[test]
    fn empty_lists_stay_empty() {
        assert!(pairs(&[]).is_empty());
    }
}
