use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{trace, warn};

use super::{DispatchReport, Logger};
use crate::error::{DeliveryError, DispatchError};
use crate::message::{Content, Tags};

/// Options accepted by [`Logger::dispatch`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispatchOptions {
    /// Return a [`Curried`] step instead of a [`Pending`] one.
    pub curry: bool,
}

impl DispatchOptions {
    /// Options for a currying step.
    pub const CURRY: Self = Self { curry: true };

    /// Builds options from keyword pairs.
    ///
    /// `curry` is the only accepted keyword; anything else is rejected before
    /// a message is built. Later pairs override earlier ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use taglog::{DispatchError, DispatchOptions};
    ///
    /// let options = DispatchOptions::from_keywords([("curry", true)])?;
    /// assert!(options.curry);
    ///
    /// let error = DispatchOptions::from_keywords([("level", true)]).unwrap_err();
    /// assert!(matches!(error, DispatchError::InvalidKeyword(name) if name == "level"));
    /// # Ok::<(), DispatchError>(())
    /// ```
    pub fn from_keywords<I, K>(keywords: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let mut options = Self::default();
        for (name, value) in keywords {
            match name.as_ref() {
                "curry" => options.curry = value,
                other => return Err(DispatchError::InvalidKeyword(other.to_owned())),
            }
        }
        Ok(options)
    }
}

/// Result of the tagging step in [`Logger::dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// Tags captured; content completes the dispatch.
    Ready(Pending),
    /// Tags captured for currying.
    Curried(Curried),
}

/// A dispatch with its tags fixed, waiting for content.
#[derive(Debug)]
#[must_use = "a pending dispatch does nothing until content is emitted"]
pub struct Pending {
    logger: Logger,
    tags: Tags,
}

impl Pending {
    pub(super) const fn new(logger: Logger, tags: Tags) -> Self {
        Self { logger, tags }
    }

    /// Tags the message will carry.
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Builds a message from the captured tags and `content` and delivers it
    /// to every registered output.
    ///
    /// Each output is isolated from the others: an error or panic in one is
    /// recorded in the report and the remaining outputs still receive the
    /// message.
    pub fn emit(self, content: Content) -> DispatchReport {
        self.logger.fan_out(self.tags, content)
    }

    /// Like [`emit`](Self::emit), converting the report into a `Result`.
    pub fn send(self, content: Content) -> Result<usize, DispatchError> {
        self.emit(content).into_result()
    }
}

/// Tags captured by [`Logger::curry`], to be combined with a later tagging
/// step.
///
/// ```
/// use taglog::{Logger, Tags};
///
/// let logger = Logger::new();
/// let pending = logger.curry(["db"]).curry(["pool"]).tags(["timeout", "db"]);
/// assert_eq!(pending.tags(), &Tags::from_display(["db", "pool", "timeout"]));
/// ```
#[derive(Clone, Debug)]
#[must_use = "a curried dispatch does nothing until tagged and emitted"]
pub struct Curried {
    logger: Logger,
    tags: Tags,
}

impl Curried {
    pub(super) const fn new(logger: Logger, tags: Tags) -> Self {
        Self { logger, tags }
    }

    /// Tags captured so far.
    pub const fn captured(&self) -> &Tags {
        &self.tags
    }

    /// Completes tagging with the union of the captured tags and `tags`.
    pub fn tags<T>(&self, tags: T) -> Pending
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        Pending::new(self.logger.clone(), self.merged(tags))
    }

    /// Captures additional tags for a further step.
    pub fn curry<T>(&self, tags: T) -> Self
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        Self::new(self.logger.clone(), self.merged(tags))
    }

    /// Emits a message carrying the union of the captured tags and `tags`.
    pub fn log<T>(&self, tags: T) -> DispatchReport
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        self.tags(tags).emit(Content::new())
    }

    fn merged<T>(&self, tags: T) -> Tags
    where
        T: IntoIterator,
        T::Item: fmt::Display,
    {
        self.tags.union(&Tags::from_display(tags))
    }
}

impl Logger {
    fn fan_out(&self, tags: Tags, content: Content) -> DispatchReport {
        let mut report = DispatchReport::default();
        {
            let outputs = self.lock_outputs();
            let message = (self.inner.factory)(tags, content);
            for (index, output) in outputs.iter().enumerate() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| output.deliver(&message)))
                    .unwrap_or_else(|payload| Err(DeliveryError::Panicked(panic_message(payload.as_ref()))));
                report.record(index, outcome);
            }
        }

        trace!(
            delivered = report.delivered(),
            filtered = report.filtered(),
            failed = report.failures().len(),
            "dispatched message"
        );
        for failure in report.failures() {
            warn!(output = failure.index, error = %failure.error, "output failed to deliver message");
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_owned()
    }
}
