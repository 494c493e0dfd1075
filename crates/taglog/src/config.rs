//! crates/taglog/src/config.rs
//! Declarative output configuration.

use std::io::Write;

use crate::destination::{Destination, WriterDestination};
use crate::error::ConfigError;
use crate::filter::{FilterChain, filters};
use crate::formatter::Formatter;
use crate::line_mode::LineMode;
use crate::output::Output;

/// Plain-data description of an [`Output`].
///
/// Tag rules use a compact token syntax: `+tag` (or a bare `tag`) requires
/// the tag, `-tag` rejects messages carrying it. A later rule for the same
/// tag replaces an earlier one.
///
/// # Examples
///
/// ```
/// use taglog::OutputConfig;
///
/// let mut config = OutputConfig::default();
/// config.template = Some("{tags}: {args[0]}".to_owned());
/// config.apply_tag_rules("net,-debug")?;
///
/// let output = config.build_writer(Vec::new())?;
/// assert_eq!(output.filter_count(), 2);
/// # Ok::<(), taglog::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutputConfig {
    /// Template text; `None` selects the default template.
    pub template: Option<String>,
    /// Tags a message must carry.
    pub include_tags: Vec<String>,
    /// Tags a message must not carry.
    pub exclude_tags: Vec<String>,
    /// Newline handling for writer destinations.
    pub line_mode: LineMode,
}

impl OutputConfig {
    /// Applies a single tag rule token (e.g. `+net`, `-debug`, `audit`).
    pub fn apply_tag_rule(&mut self, token: &str) -> Result<(), ConfigError> {
        let (include, tag) = parse_tag_rule(token)?;
        self.include_tags.retain(|existing| existing != tag);
        self.exclude_tags.retain(|existing| existing != tag);
        if include {
            self.include_tags.push(tag.to_owned());
        } else {
            self.exclude_tags.push(tag.to_owned());
        }
        Ok(())
    }

    /// Applies a comma-separated list of tag rules in order.
    pub fn apply_tag_rules(&mut self, rules: &str) -> Result<(), ConfigError> {
        rules.split(',').try_for_each(|token| self.apply_tag_rule(token))
    }

    /// Resolves the configured formatter.
    pub fn formatter(&self) -> Result<Formatter, ConfigError> {
        match &self.template {
            Some(text) => Ok(Formatter::template(text)?),
            None => Ok(Formatter::default()),
        }
    }

    /// Filters derived from the tag rules: includes first, then excludes.
    pub fn filter_chain(&self) -> FilterChain {
        let includes = self.include_tags.iter().map(|tag| filters::has_tag(tag.as_str()));
        let excludes = self.exclude_tags.iter().map(|tag| filters::lacks_tag(tag.as_str()));
        includes.chain(excludes).collect()
    }

    /// Builds an output for an arbitrary destination.
    ///
    /// The line mode only applies to [`build_writer`](Self::build_writer).
    pub fn build<D>(&self, destination: D) -> Result<Output, ConfigError>
    where
        D: Destination + 'static,
    {
        Ok(Output::builder(destination)
            .formatter(self.formatter()?)
            .filters(self.filter_chain())
            .build())
    }

    /// Builds an output writing to `writer` with the configured line mode.
    pub fn build_writer<W>(&self, writer: W) -> Result<Output, ConfigError>
    where
        W: Write + Send + 'static,
    {
        self.build(WriterDestination::with_line_mode(writer, self.line_mode))
    }
}

/// Splits a rule token into its polarity and tag name.
fn parse_tag_rule(token: &str) -> Result<(bool, &str), ConfigError> {
    let (include, tag) = match token.as_bytes().first() {
        Some(b'+') => (true, &token[1..]),
        Some(b'-') => (false, &token[1..]),
        _ => (true, token),
    };
    if tag.is_empty() {
        return Err(ConfigError::EmptyRule);
    }
    if tag.chars().any(char::is_whitespace) {
        return Err(ConfigError::Whitespace(token.to_owned()));
    }
    Ok((include, tag))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::destination::MemoryDestination;
    use crate::error::TemplateError;
    use crate::message::{Content, Message, Tags};

    fn tagged(tags: &[&str]) -> Message {
        Message::new(Tags::from_display(tags), Content::text("body"))
    }

    #[test]
    fn parse_tag_rule_tokens() {
        assert_eq!(parse_tag_rule("+net").unwrap(), (true, "net"));
        assert_eq!(parse_tag_rule("net").unwrap(), (true, "net"));
        assert_eq!(parse_tag_rule("-debug").unwrap(), (false, "debug"));
        assert_eq!(parse_tag_rule("").unwrap_err(), ConfigError::EmptyRule);
        assert_eq!(parse_tag_rule("-").unwrap_err(), ConfigError::EmptyRule);
        assert_eq!(
            parse_tag_rule("+two words").unwrap_err(),
            ConfigError::Whitespace("+two words".to_owned())
        );
    }

    #[test]
    fn later_rules_override_earlier_ones() {
        let mut config = OutputConfig::default();
        config.apply_tag_rules("net,-debug,+debug,-net").unwrap();
        assert_eq!(config.include_tags, ["debug"]);
        assert_eq!(config.exclude_tags, ["net"]);
    }

    #[test]
    fn invalid_rule_in_list_is_reported() {
        let mut config = OutputConfig::default();
        assert_eq!(config.apply_tag_rules("net,,debug").unwrap_err(), ConfigError::EmptyRule);
        assert_eq!(config.include_tags, ["net"]);
    }

    #[test]
    fn built_output_applies_rules_and_template() {
        let mut config = OutputConfig {
            template: Some("{tags}".to_owned()),
            ..OutputConfig::default()
        };
        config.apply_tag_rules("net,-noise").unwrap();

        let memory = MemoryDestination::new();
        let output = config.build(memory.clone()).unwrap();
        for tags in [&["net"][..], &["disk"][..], &["net", "noise"][..], &["net", "tcp"][..]] {
            output.deliver(&tagged(tags)).unwrap();
        }
        assert_eq!(memory.entries(), ["net", "net tcp"]);
    }

    #[test]
    fn writer_output_honours_line_mode() {
        #[derive(Clone, Default)]
        struct Shared(Arc<Mutex<Vec<u8>>>);

        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let config = OutputConfig {
            template: Some("{args[0]}".to_owned()),
            line_mode: LineMode::WithoutNewline,
            ..OutputConfig::default()
        };
        let buffer = Shared::default();
        let output = config.build_writer(buffer.clone()).unwrap();
        assert_eq!(output.filter_count(), 0);
        output.deliver(&tagged(&["any"])).unwrap();
        output.deliver(&tagged(&["any"])).unwrap();
        assert_eq!(buffer.0.lock().unwrap().as_slice(), b"bodybody");
    }

    #[test]
    fn invalid_template_is_a_config_error() {
        let config = OutputConfig {
            template: Some("{nope}".to_owned()),
            ..OutputConfig::default()
        };
        let error = config.build(MemoryDestination::new()).unwrap_err();
        assert_eq!(error, ConfigError::Template(TemplateError::UnknownField("nope".to_owned())));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn output_config_serde_roundtrip() {
            let mut config = OutputConfig::default();
            config.apply_tag_rules("net,-debug").unwrap();
            config.line_mode = LineMode::WithoutNewline;

            let json = serde_json::to_string(&config).unwrap();
            let decoded: OutputConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(config, decoded);
        }

        #[test]
        fn missing_fields_use_defaults() {
            let decoded: OutputConfig = serde_json::from_str(r#"{"include_tags": ["net"]}"#).unwrap();
            assert_eq!(decoded.include_tags, ["net"]);
            assert_eq!(decoded.template, None);
            assert_eq!(decoded.line_mode, LineMode::WithNewline);
        }
    }
}
