#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `taglog` dispatches tagged messages to a set of outputs. A caller names the
//! tags first and supplies the content afterwards; tags can be captured ahead
//! of time ("curried") and combined with more tags later. Every registered
//! output decides through its filter chain whether it wants the message, then
//! formats it and hands the text to its destination.
//!
//! # Design
//!
//! - [`Message`] is the immutable value built once per dispatch: a tag set,
//!   positional and keyword content made of [`Value`]s, and a timestamp.
//! - [`Output`] combines a [`Destination`], a [`Formatter`] (a parsed
//!   [`Template`] or a closure) and a [`FilterChain`].
//! - [`Logger`] holds the registered outputs. [`Logger::tags`] returns a
//!   [`Pending`] dispatch that [`Pending::emit`] completes;
//!   [`Logger::curry`] returns a [`Curried`] step whose tags are merged into
//!   the next step.
//! - [`OutputConfig`] describes an output as plain data, optionally
//!   deserialised with the `serde` feature.
//! - With the `subscriber` feature, `TaglogLayer` forwards `tracing` events
//!   into a logger.
//!
//! # Invariants
//!
//! - A message reaches a destination only after every filter of that output
//!   accepted it; the formatter is not consulted for rejected messages.
//! - Registering the same output instance twice keeps a single entry.
//! - The tags of a curried dispatch are the union of every step's tags.
//! - Dispatches through one logger are serialised: the output set stays
//!   locked while a message is built and delivered.
//!
//! # Errors
//!
//! Template syntax errors surface as [`TemplateError`] when an output is
//! configured. Delivery problems (formatting, destination I/O, panics inside
//! callbacks) are isolated per output and collected in a [`DispatchReport`];
//! [`DispatchReport::into_result`] turns them into a [`DispatchError`].
//!
//! # Examples
//!
//! ```
//! use taglog::{Logger, MemoryDestination, Output, content, filters};
//!
//! let errors = MemoryDestination::new();
//! let everything = MemoryDestination::new();
//!
//! let logger = Logger::new();
//! logger.add_output(
//!     Output::builder(errors.clone())
//!         .template("{tags}: {args[0]}")?
//!         .filter(filters::has_tag("error"))
//!         .build(),
//! );
//! logger.add_output(Output::builder(everything.clone()).template("{args[0]} {kwargs}")?.build());
//!
//! let db = logger.curry(["db"]);
//! db.tags(["error"]).emit(content!("connection lost", retries = 3)).into_result()?;
//! db.tags(["info"]).emit(content!("reconnected")).into_result()?;
//!
//! assert_eq!(errors.entries(), ["db error: connection lost"]);
//! assert_eq!(everything.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # See also
//!
//! - [`template`] for the template syntax.
//! - [`filters`] for ready-made predicates.

mod config;
mod destination;
pub mod error;
mod filter;
mod formatter;
mod line_mode;
mod logger;
mod macros;
mod message;
mod output;
pub mod template;
#[cfg(feature = "subscriber")]
mod tracing_bridge;
mod value;

pub use config::OutputConfig;
pub use destination::{Destination, MemoryDestination, WriterDestination};
pub use error::{
    ConfigError, DeliveryError, DeliveryFailure, DispatchError, FormatError, TemplateError,
};
pub use filter::{Filter, FilterChain, filters};
pub use formatter::Formatter;
pub use line_mode::LineMode;
pub use logger::{Curried, Dispatch, DispatchOptions, DispatchReport, Logger, Pending};
pub use message::{Content, Message, Tags};
pub use output::{Deliver, Delivery, Output, OutputBuilder};
pub use template::{DEFAULT_TEMPLATE, Template};
#[cfg(feature = "subscriber")]
pub use tracing_bridge::{TaglogLayer, init_tracing, init_tracing_with_filter};
pub use value::{Key, Repr, Value};
