//! crates/taglog/src/error.rs
//! Error types surfaced by templates, outputs and the dispatcher.

use std::io;

use thiserror::Error;

use crate::value::Key;

/// Error returned when a format template cannot be parsed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TemplateError {
    /// A `{` was opened but never closed.
    #[error("unclosed '{{' starting at byte {0}")]
    UnclosedField(usize),

    /// A lone `}` appeared outside a field.
    #[error("single '}}' encountered at byte {0}")]
    StrayBrace(usize),

    /// `{}` or a numeric field was used; templates only take named fields.
    #[error("positional field '{{{0}}}' is not supported; use date, tags, args, kwargs or message")]
    PositionalField(String),

    /// The field name is not one of the supported placeholders.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Attribute access on a value that has no such attribute.
    #[error("field '{field}' has no attribute '{attribute}'")]
    UnknownAttribute {
        /// Field the attribute was requested on.
        field: String,
        /// Requested attribute.
        attribute: String,
    },

    /// Malformed `[key]` or `.attribute` accessor.
    #[error("malformed accessor in field '{0}'")]
    MalformedAccessor(String),

    /// `[key]` applied to a field that is never a container.
    #[error("field '{0}' cannot be indexed")]
    NotIndexable(String),

    /// Conversion other than `!s` or `!r`.
    #[error("unknown conversion '!{0}'")]
    UnknownConversion(String),

    /// The format spec after `:` could not be understood.
    #[error("invalid format spec '{spec}': {reason}")]
    InvalidSpec {
        /// The offending spec.
        spec: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Error raised while rendering a message through a formatter.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A `[key]` lookup found nothing.
    #[error("no value for key '{key}' in '{field}'")]
    MissingKey {
        /// Rendered path of the container being indexed.
        field: String,
        /// The key that was looked up.
        key: Key,
    },

    /// A `[key]` lookup was applied to something that cannot be indexed.
    #[error("'{field}' cannot be indexed")]
    NotIndexable {
        /// Rendered path of the value.
        field: String,
    },

    /// The timestamp could not be formatted.
    #[error("date formatting failed: {0}")]
    Date(#[from] time::error::Format),
}

/// Error produced when a single output fails to deliver a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The formatter failed.
    #[error("formatter failed: {0}")]
    Format(#[from] FormatError),

    /// The destination rejected the formatted text.
    #[error("destination failed: {0}")]
    Destination(#[from] io::Error),

    /// A filter, formatter or destination callback panicked.
    #[error("output panicked: {0}")]
    Panicked(String),
}

/// A delivery failure tagged with the position of the output that produced it.
#[derive(Debug, Error)]
#[error("output #{index}: {error}")]
pub struct DeliveryFailure {
    /// Position of the output in the logger's registration order.
    pub index: usize,
    /// The underlying failure.
    #[source]
    pub error: DeliveryError,
}

/// Error returned by the tag-dispatch protocol.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A keyword other than `curry` was supplied at the tagging step.
    #[error("invalid keyword argument '{0}'; only 'curry' is accepted")]
    InvalidKeyword(String),

    /// One or more outputs failed during fan-out.
    #[error("{} output(s) failed to deliver", .failures.len())]
    Delivery {
        /// Every failure collected during the fan-out.
        failures: Vec<DeliveryFailure>,
    },
}

/// Error returned when an output configuration token cannot be parsed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    /// The token was empty or consisted only of a sign.
    #[error("empty tag rule")]
    EmptyRule,

    /// The token contained whitespace.
    #[error("tag rule '{0}' contains whitespace")]
    Whitespace(String),

    /// The configured template failed to parse.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_error_messages_mention_context() {
        let error = TemplateError::UnknownField("mesage".to_owned());
        assert_eq!(error.to_string(), "unknown field 'mesage'");

        let error = TemplateError::UnclosedField(4);
        assert_eq!(error.to_string(), "unclosed '{' starting at byte 4");

        let error = TemplateError::StrayBrace(2);
        assert_eq!(error.to_string(), "single '}' encountered at byte 2");
    }

    #[test]
    fn invalid_keyword_names_the_keyword() {
        let error = DispatchError::InvalidKeyword("level".to_owned());
        let display = error.to_string();
        assert!(display.contains("invalid keyword argument"));
        assert!(display.contains("level"));
    }

    #[test]
    fn delivery_failure_reports_index() {
        let failure = DeliveryFailure {
            index: 3,
            error: DeliveryError::Panicked("boom".to_owned()),
        };
        assert_eq!(failure.to_string(), "output #3: output panicked: boom");
    }

    #[test]
    fn destination_error_converts_from_io() {
        let error: DeliveryError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(error, DeliveryError::Destination(_)));
    }
}
