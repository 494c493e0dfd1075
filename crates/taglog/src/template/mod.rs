//! Format templates with named placeholders.
//!
//! A template is plain text with replacement fields in braces. The supported
//! fields are `{date}`, `{tags}` (space-joined), `{args}`, `{kwargs}` and
//! `{message}`. Containers can be indexed (`{kwargs[key]}`, `{args[0]}`,
//! nested as `{kwargs[user][name]}`) and the message's own parts are reachable
//! as attributes (`{message.kwargs[key]}`, `{message.tags}`).
//!
//! After the field name an optional conversion selects quoting (`!r`) or the
//! plain form (`!s`, the default). A format spec after `:` is either a
//! [`time` format description] for `date` (`{date:[hour]:[minute]}`) or
//! `[[fill]align][width]` for everything else (`{tags:>20}`). `{{` and `}}`
//! produce literal braces.
//!
//! Templates are parsed once. Mistakes in the template itself are reported by
//! [`Template::parse`]; only data-dependent problems such as a missing key
//! surface when rendering.
//!
//! [`time` format description]: https://time-rs.github.io/book/api/format-description.html

mod parser;
mod render;
mod tokens;


use std::fmt;
use std::str::FromStr;

use crate::error::TemplateError;

use tokens::TemplateToken;

/// Template applied when an output is built without a formatter.
pub const DEFAULT_TEMPLATE: &str = "{date} : {tags} : {args} {kwargs}\n";

/// A parsed format template.
///
/// # Examples
///
/// ```
/// use taglog::{Content, Message, Tags, Template};
///
/// let template = Template::parse("just testing, key = {kwargs[key]}")?;
/// let message = Message::new(Tags::new(), Content::new().kwarg("key", 1337));
/// assert_eq!(template.render(&message)?, "just testing, key = 1337");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
    tokens: Vec<TemplateToken>,
}

impl Template {
    /// Parses `text` into a template.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            source: text.to_owned(),
            tokens: parser::parse_template(text)?,
        })
    }

    /// The template as originally written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE).unwrap_or_else(|error| {
            unreachable!("built-in template failed to parse: {error}")
        })
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
