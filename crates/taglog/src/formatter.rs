//! crates/taglog/src/formatter.rs
//! Formatter selection for outputs.

use std::fmt;
use std::sync::Arc;

use crate::error::{FormatError, TemplateError};
use crate::message::Message;
use crate::template::Template;

type CustomFormat = dyn Fn(&Message) -> String + Send + Sync;

/// Turns a [`Message`] into the text handed to a destination.
///
/// The three ways of configuring an output's formatter are normalised into
/// this enum when the output is built, so delivery never has to inspect what
/// kind of formatter it was given:
///
/// - nothing → [`Formatter::default`], the [`DEFAULT_TEMPLATE`](crate::DEFAULT_TEMPLATE);
/// - a template string → [`Formatter::template`];
/// - a callable → [`Formatter::custom`], used verbatim.
#[derive(Clone)]
pub enum Formatter {
    /// Substitutes message fields into a parsed [`Template`].
    Template(Template),
    /// Arbitrary user formatting.
    Custom(Arc<CustomFormat>),
}

impl Formatter {
    /// Parses `text` as a template formatter.
    pub fn template(text: &str) -> Result<Self, TemplateError> {
        Template::parse(text).map(Self::Template)
    }

    /// Wraps a formatting closure.
    pub fn custom<F>(format: F) -> Self
    where
        F: Fn(&Message) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(format))
    }

    /// Formats `message`.
    pub fn format(&self, message: &Message) -> Result<String, FormatError> {
        match self {
            Self::Template(template) => template.render(message),
            Self::Custom(format) => Ok(format(message)),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::Template(Template::default())
    }
}

impl From<Template> for Formatter {
    fn from(template: Template) -> Self {
        Self::Template(template)
    }
}

impl TryFrom<&str> for Formatter {
    type Error = TemplateError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::template(text)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(&template.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
