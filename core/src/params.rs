//! Ordered request parameters.
//!
//! `Params` keeps keys in first-insertion order and overwrites values in
//! place, so overlaying one mapping on another behaves like a last-write-wins
//! merge while keeping the output stable. The same mapping is rendered as a
//! query string for GET/DELETE and as a JSON object for POST/PUT.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::ser::{Serialize, SerializeMap, Serializer};
use url::form_urlencoded;

/// Bytes left as-is in query keys and values: alphanumerics plus
/// `- . _ ~ ! ' ( ) *`. Everything else is `%XX`-escaped, spaces included.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// A single parameter value: a scalar or a list of values.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Push this value's `key=value` pair(s). Lists expand into one pair
    /// per element; non-finite floats render as an empty value.
    fn append_to(&self, key: &str, out: &mut Vec<String>) {
        let value = match self {
            ParamValue::String(s) => s.clone(),
            ParamValue::Integer(n) => n.to_string(),
            ParamValue::Float(n) if n.is_finite() => n.to_string(),
            ParamValue::Float(_) => String::new(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::List(items) => {
                for item in items {
                    item.append_to(key, out);
                }
                return;
            }
        };
        out.push(format!(
            "{}={}",
            utf8_percent_encode(key, QUERY_COMPONENT),
            utf8_percent_encode(&value, QUERY_COMPONENT)
        ));
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::String(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered string-keyed parameters with last-write-wins updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`, returning the previous value. An existing key
    /// keeps its position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Overlay `other` on top of `self`; `other` wins on collisions.
    pub fn extend(&mut self, other: &Params) {
        for (key, value) in &other.entries {
            self.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse `application/x-www-form-urlencoded` text. A key that appears
    /// more than once collects its values into a list.
    pub fn from_query(query: &str) -> Self {
        let mut params = Params::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = ParamValue::String(value.into_owned());
            match params.entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, ParamValue::List(items))) => items.push(value),
                Some((_, slot)) => {
                    let first = std::mem::replace(slot, ParamValue::List(Vec::new()));
                    *slot = ParamValue::List(vec![first, value]);
                }
                None => params.entries.push((key.into_owned(), value)),
            }
        }
        params
    }

    /// Render as a query string. Spaces become `%20`, not `+`.
    pub fn to_query(&self) -> String {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            value.append_to(key, &mut pairs);
        }
        pairs.join("&")
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}
