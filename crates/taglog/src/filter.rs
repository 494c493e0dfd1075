//! crates/taglog/src/filter.rs
//! Message predicates and the per-output filter chain.

use std::fmt;
use std::sync::Arc;

use crate::message::Message;

type Predicate = dyn Fn(&Message) -> bool + Send + Sync;

/// A predicate deciding whether an output accepts a message.
#[derive(Clone)]
pub struct Filter(Arc<Predicate>);

impl Filter {
    /// Wraps a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// A filter that accepts every message.
    pub fn accept_all() -> Self {
        Self::new(|_| true)
    }

    /// Evaluates the predicate.
    pub fn matches(&self, message: &Message) -> bool {
        (self.0)(message)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// Ordered list of filters; a message passes when every filter accepts it.
///
/// A single filter and a one-element sequence are the same chain, and an
/// empty chain accepts everything.
#[derive(Clone, Debug, Default)]
pub struct FilterChain(Vec<Filter>);

impl FilterChain {
    /// Creates an empty chain.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: Filter) {
        self.0.push(filter);
    }

    /// Reports whether every filter accepts `message`.
    pub fn accepts(&self, message: &Message) -> bool {
        self.0.iter().all(|filter| filter.matches(message))
    }

    /// Number of filters in the chain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Filter> for FilterChain {
    fn from(filter: Filter) -> Self {
        Self(vec![filter])
    }
}

impl From<Vec<Filter>> for FilterChain {
    fn from(filters: Vec<Filter>) -> Self {
        Self(filters)
    }
}

impl FromIterator<Filter> for FilterChain {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FilterChain {
    type Item = Filter;
    type IntoIter = std::vec::IntoIter<Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Extend<Filter> for FilterChain {
    fn extend<I: IntoIterator<Item = Filter>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Ready-made filters over tags and keyword content.
pub mod filters {
    use super::Filter;

    /// Accepts messages carrying `tag`.
    pub fn has_tag(tag: impl Into<String>) -> Filter {
        let tag = tag.into();
        Filter::new(move |message| message.has_tag(&tag))
    }

    /// Accepts messages that do not carry `tag`.
    pub fn lacks_tag(tag: impl Into<String>) -> Filter {
        let tag = tag.into();
        Filter::new(move |message| !message.has_tag(&tag))
    }

    /// Accepts messages carrying every tag in `tags`.
    pub fn has_all_tags<I>(tags: I) -> Filter
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        Filter::new(move |message| tags.iter().all(|tag| message.has_tag(tag)))
    }

    /// Accepts messages carrying at least one tag in `tags`.
    pub fn has_any_tag<I>(tags: I) -> Filter
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        Filter::new(move |message| tags.iter().any(|tag| message.has_tag(tag)))
    }

    /// Accepts messages with a keyword argument named `key`.
    pub fn has_kwarg(key: impl Into<String>) -> Filter {
        let key = key.into();
        Filter::new(move |message| message.kwarg(&key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::filters::*;
    use super::*;
    use crate::message::{Content, Tags};

    fn tagged(tags: &[&str]) -> Message {
        Message::new(Tags::from_display(tags), Content::new())
    }

    #[test]
    fn empty_chain_accepts_everything() {
        assert!(FilterChain::new().accepts(&tagged(&[])));
    }

    #[test]
    fn chain_requires_every_filter() {
        let chain: FilterChain = [has_tag("a"), has_tag("b")].into_iter().collect();
        assert!(chain.accepts(&tagged(&["a", "b"])));
        assert!(!chain.accepts(&tagged(&["a"])));
        assert!(!chain.accepts(&tagged(&["b"])));
    }

    #[test]
    fn single_filter_matches_one_element_chain() {
        let single = FilterChain::from(has_tag("x"));
        let sequence = FilterChain::from(vec![has_tag("x")]);
        for message in [tagged(&["x"]), tagged(&["y"]), tagged(&[])] {
            assert_eq!(single.accepts(&message), sequence.accepts(&message));
        }
    }

    #[test]
    fn builtin_tag_filters() {
        let message = tagged(&["net", "warn"]);
        assert!(has_tag("net").matches(&message));
        assert!(!lacks_tag("net").matches(&message));
        assert!(lacks_tag("debug").matches(&message));
        assert!(has_all_tags(["net", "warn"]).matches(&message));
        assert!(!has_all_tags(["net", "debug"]).matches(&message));
        assert!(has_any_tag(["debug", "warn"]).matches(&message));
        assert!(!has_any_tag(["debug", "trace"]).matches(&message));
        assert!(Filter::accept_all().matches(&message));
    }

    #[test]
    fn has_kwarg_checks_presence() {
        let with = Message::new(Tags::new(), Content::new().kwarg("testattr", true));
        let without = tagged(&[]);
        assert!(has_kwarg("testattr").matches(&with));
        assert!(!has_kwarg("testattr").matches(&without));
    }

    #[test]
    fn extend_appends_filters() {
        let mut chain = FilterChain::from(has_tag("a"));
        chain.extend([has_tag("b")]);
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
    }
}
