//! crates/taglog/src/value.rs
//! Content values carried by a [`Message`](crate::Message).

use std::collections::BTreeMap;
use std::fmt;

/// A single piece of message content.
///
/// Positional and keyword content is opaque to the dispatcher; only filters
/// and formatters inspect it. `Value` keeps the handful of shapes a log line
/// typically carries and renders them in two styles:
///
/// - [`Display`](fmt::Display) prints strings verbatim and everything else in
///   a compact literal form. This is what `{kwargs[key]}` produces.
/// - [`Value::repr`] quotes strings. Containers always render their items
///   this way, so `["hello world!"]` stays unambiguous.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for [`Value::Int`].
    ///
    /// The `From` conversions only produce this variant above `i64::MAX`, so
    /// equal numbers compare equal regardless of their source type.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// String-keyed mapping, iterated in key order.
    Map(BTreeMap<String, Value>),
}

/// Index applied to a container value, written `[key]` in templates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Key {
    /// Positional index, produced when the key consists only of ASCII digits.
    Index(usize),
    /// Named key.
    Name(String),
}

impl Key {
    /// Parses a template key, treating all-digit keys as positional indices.
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                return Self::Index(index);
            }
        }
        Self::Name(text.to_owned())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl Value {
    /// Returns a wrapper that renders the value with strings quoted.
    pub const fn repr(&self) -> Repr<'_> {
        Repr(self)
    }

    /// Returns the string slice when the value is [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Looks up `key` inside a list or map.
    ///
    /// Maps accept positional keys by their decimal spelling so `{x[0]}`
    /// works for a map keyed `"0"`. Scalars are not indexable and yield
    /// `None`, as do missing keys and out-of-range indices.
    pub fn get(&self, key: &Key) -> Option<&Self> {
        match (self, key) {
            (Self::List(items), Key::Index(index)) => items.get(*index),
            (Self::Map(entries), Key::Name(name)) => entries.get(name),
            (Self::Map(entries), Key::Index(index)) => entries.get(&index.to_string()),
            _ => None,
        }
    }

    /// Reports whether [`get`](Self::get) can ever succeed on this value.
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            other => fmt::Display::fmt(&other.repr(), f),
        }
    }
}

/// Quoting renderer returned by [`Value::repr`].
#[derive(Clone, Copy, Debug)]
pub struct Repr<'a>(&'a Value);

impl fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => f.write_str("null"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Int(number) => write!(f, "{number}"),
            Value::UInt(number) => write!(f, "{number}"),
            Value::Float(number) => write!(f, "{number:?}"),
            Value::Str(text) => write!(f, "{text:?}"),
            Value::List(items) => write_list(f, items),
            Value::Map(entries) => write_map(f, entries),
        }
    }
}

pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (position, item) in items.iter().enumerate() {
        if position > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item.repr())?;
    }
    f.write_str("]")
}

pub(crate) fn write_map(f: &mut fmt::Formatter<'_>, entries: &BTreeMap<String, Value>) -> fmt::Result {
    f.write_str("{")?;
    for (position, (key, item)) in entries.iter().enumerate() {
        if position > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key:?}: {}", item.repr())?;
    }
    f.write_str("}")
}

macro_rules! value_from_int {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(number: $source) -> Self {
                    Self::$variant(<$target>::from(number))
                }
            }
        )+
    };
}

value_from_int!(Int as i64: i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(number: u64) -> Self {
        i64::try_from(number).map_or(Self::UInt(number), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(number: usize) -> Self {
        match i64::try_from(number) {
            Ok(signed) => Self::Int(signed),
            Err(_) => u64::try_from(number).map_or(Self::Null, Self::UInt),
        }
    }
}

impl From<isize> for Value {
    fn from(number: isize) -> Self {
        i64::try_from(number).map_or(Self::Null, Self::Int)
    }
}

impl From<f32> for Value {
    fn from(number: f32) -> Self {
        Self::Float(f64::from(number))
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Float(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<char> for Value {
    fn from(ch: char) -> Self {
        Self::Str(ch.to_string())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(text.to_owned())
    }
}

impl From<&String> for Value {
    fn from(text: &String) -> Self {
        Self::Str(text.clone())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Str(text)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Self>,
{
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T> From<BTreeMap<String, T>> for Value
where
    T: Into<Self>,
{
    fn from(entries: BTreeMap<String, T>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<T> FromIterator<T> for Value
where
    T: Into<Self>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}
