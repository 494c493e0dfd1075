//! Outputs: a destination behind a filter chain and a formatter.

mod builder;
mod delivery;

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::destination::Destination;
use crate::error::DeliveryError;
use crate::filter::FilterChain;
use crate::formatter::Formatter;
use crate::message::Message;

pub use builder::OutputBuilder;

/// Outcome of handing a message to an output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delivery {
    /// Every filter accepted the message and the destination received it.
    Delivered,
    /// A filter rejected the message; nothing was formatted or written.
    Filtered,
}

/// Anything the [`Logger`](crate::Logger) can fan a message out to.
///
/// [`Output`] is the usual implementor. Plain closures taking a `&Message`
/// are accepted too, for sinks that want the structured message rather than
/// formatted text.
pub trait Deliver: Send + Sync {
    /// Processes `message`.
    fn deliver(&self, message: &Message) -> Result<Delivery, DeliveryError>;
}

impl<F> Deliver for F
where
    F: Fn(&Message) + Send + Sync,
{
    fn deliver(&self, message: &Message) -> Result<Delivery, DeliveryError> {
        self(message);
        Ok(Delivery::Delivered)
    }
}

/// A configured sink: destination, formatter and filter chain.
///
/// A message reaches the destination only after passing every filter in the
/// chain. All three parts live behind one lock, so filters and the formatter
/// may be changed while other threads deliver through the same output.
///
/// # Examples
///
/// ```
/// use taglog::{Content, Delivery, Filter, MemoryDestination, Message, Output, Tags};
///
/// let memory = MemoryDestination::new();
/// let output = Output::builder(memory.clone())
///     .template("{tags}: {args[0]}")?
///     .filter(Filter::new(|message| message.has_tag("net")))
///     .build();
///
/// let quiet = Message::new(Tags::from_display(["disk"]), Content::text("full"));
/// assert_eq!(output.deliver(&quiet)?, Delivery::Filtered);
///
/// let loud = Message::new(Tags::from_display(["net"]), Content::text("down"));
/// assert_eq!(output.deliver(&loud)?, Delivery::Delivered);
/// assert_eq!(memory.entries(), ["net: down"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Output {
    state: Mutex<OutputState>,
}

struct OutputState {
    destination: Box<dyn Destination>,
    formatter: Formatter,
    filters: FilterChain,
}

impl Output {
    /// Creates an output with the default formatter and no filters.
    pub fn new<D>(destination: D) -> Self
    where
        D: Destination + 'static,
    {
        Self::builder(destination).build()
    }

    /// Starts configuring an output for `destination`.
    pub fn builder<D>(destination: D) -> OutputBuilder
    where
        D: Destination + 'static,
    {
        OutputBuilder::new(Box::new(destination))
    }

    fn from_parts(destination: Box<dyn Destination>, formatter: Formatter, filters: FilterChain) -> Self {
        Self {
            state: Mutex::new(OutputState {
                destination,
                formatter,
                filters,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Deliver for Output {
    fn deliver(&self, message: &Message) -> Result<Delivery, DeliveryError> {
        Self::deliver(self, message)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return f.write_str("Output { <delivering> }"),
        };
        f.debug_struct("Output")
            .field("formatter", &state.formatter)
            .field("filters", &state.filters.len())
            .finish_non_exhaustive()
    }
}
