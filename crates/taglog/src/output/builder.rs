use std::fmt;

use super::Output;
use crate::destination::Destination;
use crate::error::TemplateError;
use crate::filter::{Filter, FilterChain};
use crate::formatter::Formatter;
use crate::message::Message;

/// Step-by-step configuration for an [`Output`].
///
/// Created by [`Output::builder`]. Without further configuration the output
/// uses the default template and accepts every message.
#[must_use = "call build() to obtain the output"]
pub struct OutputBuilder {
    destination: Box<dyn Destination>,
    formatter: Formatter,
    filters: FilterChain,
}

impl OutputBuilder {
    pub(super) fn new(destination: Box<dyn Destination>) -> Self {
        Self {
            destination,
            formatter: Formatter::default(),
            filters: FilterChain::new(),
        }
    }

    /// Uses `formatter` in place of the default template.
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Parses `text` and uses it as the template.
    pub fn template(self, text: &str) -> Result<Self, TemplateError> {
        Ok(self.formatter(Formatter::template(text)?))
    }

    /// Uses a formatting closure verbatim.
    pub fn format_with<F>(self, format: F) -> Self
    where
        F: Fn(&Message) -> String + Send + Sync + 'static,
    {
        self.formatter(Formatter::custom(format))
    }

    /// Appends a single filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Appends a sequence of filters in order.
    pub fn filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        self.filters.extend(filters);
        self
    }

    /// Finishes configuration.
    pub fn build(self) -> Output {
        Output::from_parts(self.destination, self.formatter, self.filters)
    }
}

impl fmt::Debug for OutputBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBuilder")
            .field("formatter", &self.formatter)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}
