//! crates/taglog/src/tracing_bridge.rs
//! Bridge from the tracing crate into a [`Logger`].
//!
//! [`TaglogLayer`] is a `tracing-subscriber` layer that turns every tracing
//! event into a tagged message:
//!
//! - tags: the lowercase level (`info`, `warn`, ...) and the event target;
//! - positional content: the event's `message` field, when present;
//! - keyword content: every other recorded field.
//!
//! Events whose target starts with `taglog` are the crate's own diagnostics
//! and are skipped. Events raised on a thread that is already forwarding an
//! event (for example by a destination writing through the same logger) are
//! dropped as well, since the logger lock is held at that point.
//!
//! # Usage
//!
//! ```rust,ignore
//! use taglog::{Logger, Output, WriterDestination, init_tracing};
//!
//! let logger = Logger::new();
//! logger.add_output(Output::new(WriterDestination::new(std::io::stderr())));
//! init_tracing(logger);
//!
//! tracing::info!(target: "app::net", peer = "10.0.0.1", "connected");
//! ```

use std::cell::Cell;
use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::logger::Logger;
use crate::message::Content;
use crate::value::Value;

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// A tracing layer that forwards events to a [`Logger`].
#[derive(Clone, Debug)]
pub struct TaglogLayer {
    logger: Logger,
}

impl TaglogLayer {
    /// Creates a layer that dispatches through `logger`.
    #[must_use]
    pub const fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// The logger events are forwarded to.
    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }

    fn is_internal(target: &str) -> bool {
        target == "taglog" || target.starts_with("taglog::")
    }
}

impl<S> Layer<S> for TaglogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if Self::is_internal(metadata.target()) || FORWARDING.with(Cell::get) {
            return;
        }

        let mut visitor = ContentVisitor::default();
        event.record(&mut visitor);

        let _forwarding = ForwardingGuard::enter();
        let level = metadata.level().as_str().to_ascii_lowercase();
        // Failures are reported by the dispatcher under the `taglog` target.
        let _ = self
            .logger
            .tags([level.as_str(), metadata.target()])
            .emit(visitor.into_content());
    }
}

/// Marks the current thread as forwarding until dropped.
struct ForwardingGuard;

impl ForwardingGuard {
    fn enter() -> Self {
        FORWARDING.with(|flag| flag.set(true));
        Self
    }
}

impl Drop for ForwardingGuard {
    fn drop(&mut self) {
        FORWARDING.with(|flag| flag.set(false));
    }
}

/// Collects event fields into message content.
#[derive(Default)]
struct ContentVisitor {
    message: Option<Value>,
    fields: Vec<(String, Value)>,
}

impl ContentVisitor {
    fn record(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_owned(), value));
        }
    }

    fn into_content(self) -> Content {
        let content = self.message.into_iter().fold(Content::new(), Content::arg);
        self.fields
            .into_iter()
            .fold(content, |content, (key, value)| content.kwarg(key, value))
    }
}

impl Visit for ContentVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, Value::from(format!("{value:?}")));
    }
}

/// Installs a global subscriber that forwards every tracing event to `logger`.
///
/// # Panics
///
/// Panics if a global default subscriber has already been set.
pub fn init_tracing(logger: Logger) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry().with(TaglogLayer::new(logger)).init();
}

/// Like [`init_tracing`], with an extra filtering layer applied first.
///
/// # Panics
///
/// Panics if a global default subscriber has already been set.
pub fn init_tracing_with_filter<F>(logger: Logger, filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(TaglogLayer::new(logger))
        .init();
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::message::Message;

    fn capture() -> (Logger, Arc<Mutex<Vec<Message>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = Logger::new();
        logger.register_output(Arc::new(move |message: &Message| {
            sink.lock().unwrap().push(message.clone());
        }));
        (logger, seen)
    }

    #[test]
    fn events_become_tagged_messages() {
        let (logger, seen) = capture();
        let subscriber = tracing_subscriber::registry().with(TaglogLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "app::net", peer = "10.0.0.1", attempt = 3_u64, "connected");
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let message = &seen[0];
        assert!(message.has_tag("info"));
        assert!(message.has_tag("app::net"));
        assert_eq!(message.arg(0), Some(&Value::from("connected")));
        assert_eq!(message.kwarg("peer"), Some(&Value::from("10.0.0.1")));
        assert_eq!(message.kwarg("attempt"), Some(&Value::from(3)));
    }

    #[test]
    fn internal_targets_are_skipped() {
        let (logger, seen) = capture();
        let subscriber = tracing_subscriber::registry().with(TaglogLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "taglog::logger", "ignored");
            tracing::warn!(target: "taglogger", "kept");
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].has_tag("taglogger"));
    }

    #[test]
    fn events_raised_while_forwarding_are_dropped() {
        let logger = Logger::new();
        let count = Arc::new(Mutex::new(0_usize));
        let counter = Arc::clone(&count);
        logger.register_output(Arc::new(move |_: &Message| {
            *counter.lock().unwrap() += 1;
            tracing::error!(target: "app::sink", "nested");
        }));
        let subscriber = tracing_subscriber::registry().with(TaglogLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "app", "outer");
        });

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn internal_target_check() {
        assert!(TaglogLayer::is_internal("taglog"));
        assert!(TaglogLayer::is_internal("taglog::logger::dispatch"));
        assert!(!TaglogLayer::is_internal("taglogger"));
        assert!(!TaglogLayer::is_internal("app::taglog"));
    }
}
