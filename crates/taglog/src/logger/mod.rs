//! crates/taglog/src/logger/mod.rs
//! The tag-curry dispatcher.
//!
//! A [`Logger`] owns the set of registered outputs and a message factory.
//! Callers name tags first and content second:
//!
//! ```
//! use taglog::{Logger, MemoryDestination, Output, content};
//!
//! let memory = MemoryDestination::new();
//! let logger = Logger::new();
//! logger.add_output(Output::builder(memory.clone()).template("{tags} {kwargs[user]}")?.build());
//!
//! let auth = logger.curry(["auth"]);
//! auth.tags(["login"]).emit(content!(user = "ada")).into_result()?;
//! assert_eq!(memory.entries(), ["auth login ada"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The output set is guarded by a single mutex held while a message is built
//! and fanned out, so concurrent dispatches are serialised and every output
//! observes messages in the same order. Destinations must not register or
//! dispatch on the logger that is currently delivering to them.

mod dispatch;
mod report;

use std::fmt;
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::message::{Content, Message, Tags};
use crate::output::{Deliver, Output};

pub use dispatch::{Curried, Dispatch, DispatchOptions, Pending};
pub use report::DispatchReport;

type MessageFactory = dyn Fn(Tags, Content) -> Message + Send + Sync;

/// Fan-out dispatcher for tagged messages.
///
/// Cloning is cheap; clones share outputs and factory.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    outputs: Mutex<Vec<Arc<dyn Deliver>>>,
    factory: Box<MessageFactory>,
}

impl Logger {
    /// Creates a logger with no outputs that stamps messages with the
    /// current time.
    pub fn new() -> Self {
        Self::with_factory(Message::new)
    }

    /// Creates a logger whose messages are built by `factory`.
    ///
    /// The factory runs once per dispatch, while the output lock is held.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(Tags, Content) -> Message + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(LoggerInner {
                outputs: Mutex::new(Vec::new()),
                factory: Box::new(factory),
            }),
        }
    }

    /// Registers an output.
    ///
    /// Outputs are identified by their allocation: registering the same
    /// `Arc` (or a clone of it) twice leaves a single entry and returns
    /// `false` the second time.
    pub fn register_output(&self, output: Arc<dyn Deliver>) -> bool {
        let mut outputs = self.lock_outputs();
        if outputs.iter().any(|existing| same_output(existing, &output)) {
            return false;
        }
        outputs.push(output);
        true
    }

    /// Registers `output` and returns the shared handle used for it.
    ///
    /// The handle can be kept to adjust filters or the formatter later, or to
    /// unregister the output.
    pub fn add_output(&self, output: Output) -> Arc<Output> {
        let shared = Arc::new(output);
        self.register_output(shared.clone());
        shared
    }

    /// Removes a previously registered output. Returns `false` when it was
    /// not registered.
    pub fn unregister_output<D>(&self, output: &Arc<D>) -> bool
    where
        D: Deliver + ?Sized,
    {
        let mut outputs = self.lock_outputs();
        let before = outputs.len();
        outputs.retain(|existing| !same_output(existing, output));
        outputs.len() != before
    }

    /// Number of registered outputs.
    pub fn output_count(&self) -> usize {
        self.lock_outputs().len()
    }

    /// Starts a dispatch with `tags`; the returned [`Pending`] awaits content.
    pub fn tags<T>(&self, tags: T) -> Pending
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        Pending::new(self.clone(), Tags::from_display(tags))
    }

    /// Captures `tags` for later use; see [`Curried`].
    pub fn curry<T>(&self, tags: T) -> Curried
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        Curried::new(self.clone(), Tags::from_display(tags))
    }

    /// Tagging step with explicit options.
    ///
    /// Equivalent to [`tags`](Self::tags) when `options.curry` is `false` and
    /// to [`curry`](Self::curry) otherwise.
    pub fn dispatch<T>(&self, tags: T, options: DispatchOptions) -> Dispatch
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        if options.curry {
            Dispatch::Curried(self.curry(tags))
        } else {
            Dispatch::Ready(self.tags(tags))
        }
    }

    /// Emits a message carrying only `tags`.
    pub fn log<T>(&self, tags: T) -> DispatchReport
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        self.tags(tags).emit(Content::new())
    }

    fn lock_outputs(&self) -> MutexGuard<'_, Vec<Arc<dyn Deliver>>> {
        self.inner.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.outputs.try_lock() {
            Ok(outputs) => f.debug_struct("Logger").field("outputs", &outputs.len()).finish_non_exhaustive(),
            Err(_) => f.debug_struct("Logger").finish_non_exhaustive(),
        }
    }
}

fn same_output<D>(existing: &Arc<dyn Deliver>, candidate: &Arc<D>) -> bool
where
    D: Deliver + ?Sized,
{
    ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(candidate))
}
