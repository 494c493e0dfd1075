//! crates/taglog/src/message.rs
//! The message value object built by every dispatch.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::SystemTime;

use time::OffsetDateTime;

use crate::value::{Value, write_list, write_map};

/// Deduplicated set of tags attached to a [`Message`].
///
/// Tags are stored as strings regardless of the type they were supplied as.
/// Iteration happens in sorted order, which keeps rendered output stable, but
/// callers must treat the set as unordered.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// Creates an empty tag set.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Collects tags from any iterator of displayable items.
    pub fn from_display<I>(tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        Self(tags.into_iter().map(|tag| tag.to_string()).collect())
    }

    /// Inserts a tag, returning `false` if it was already present.
    pub fn insert(&mut self, tag: impl fmt::Display) -> bool {
        self.0.insert(tag.to_string())
    }

    /// Reports whether `tag` is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Returns the union of both tag sets.
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Space-joined rendering used by the `{tags}` placeholder.
impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, tag) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(" ")?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

impl<T> FromIterator<T> for Tags
where
    T: fmt::Display,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_display(iter)
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Positional and keyword content supplied at the second dispatch step.
///
/// # Examples
///
/// ```
/// use taglog::{Content, Value};
///
/// let content = Content::new().arg("hello world!").kwarg("key", 1337);
/// assert_eq!(content.args(), &[Value::from("hello world!")]);
/// assert_eq!(content.kwargs()["key"], Value::from(1337));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Content {
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl Content {
    /// Creates empty content.
    pub const fn new() -> Self {
        Self {
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Creates content holding a single positional text argument.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().arg(text.into())
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing any earlier value for `key`.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Positional arguments in the order they were supplied.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Keyword arguments.
    pub const fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }

    /// Reports whether neither positional nor keyword content is present.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// Splits the content into its positional and keyword parts.
    pub fn into_parts(self) -> (Vec<Value>, BTreeMap<String, Value>) {
        (self.args, self.kwargs)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

/// A tagged log message.
///
/// Built once per dispatch and shared by reference with every output. The
/// timestamp is captured when the message is constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    tags: Tags,
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
    date: OffsetDateTime,
}

impl Message {
    /// Builds a message stamped with the current time.
    ///
    /// The timestamp is in UTC, so `{date}` renders UTC wall-clock time. Use
    /// [`Message::with_date`] from a custom factory for another offset.
    pub fn new(tags: Tags, content: Content) -> Self {
        let (args, kwargs) = content.into_parts();
        Self {
            tags,
            args,
            kwargs,
            date: OffsetDateTime::from(SystemTime::now()),
        }
    }

    /// Replaces the timestamp.
    pub const fn with_date(mut self, date: OffsetDateTime) -> Self {
        self.date = date;
        self
    }

    /// The message's tags.
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Reports whether the message carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Positional content.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Keyword content.
    pub const fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }

    /// Keyword argument named `key`.
    pub fn kwarg(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    /// Creation timestamp.
    pub const fn date(&self) -> OffsetDateTime {
        self.date
    }
}

/// Compact one-line rendering used by the bare `{message}` placeholder.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.tags)?;
        write_list(f, &self.args)?;
        f.write_str(" ")?;
        write_map(f, &self.kwargs)
    }
}
