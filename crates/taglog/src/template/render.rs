//! Rendering helpers for parsed templates.

use std::collections::BTreeMap;
use std::fmt;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::error::FormatError;
use crate::message::{Message, Tags};
use crate::value::{Key, Value, write_list, write_map};

use super::Template;
use super::tokens::{Align, Conversion, FieldFormat, FieldRoot, FieldToken, Padding, TemplateToken};

impl Template {
    /// Renders `message` according to the parsed tokens.
    pub fn render(&self, message: &Message) -> Result<String, FormatError> {
        let mut buffer = String::new();
        for token in &self.tokens {
            match token {
                TemplateToken::Literal(text) => buffer.push_str(text),
                TemplateToken::Field(field) => render_field(message, field, &mut buffer)?,
            }
        }
        Ok(buffer)
    }
}

/// Renders a timestamp the way `{date}` does without a format spec.
pub(crate) fn format_default_date(date: OffsetDateTime) -> Result<String, FormatError> {
    Ok(date.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
    ))?)
}

enum Resolved<'m> {
    Args(&'m [Value]),
    Kwargs(&'m BTreeMap<String, Value>),
    Value(&'m Value),
}

fn render_field(message: &Message, field: &FieldToken, buffer: &mut String) -> Result<(), FormatError> {
    let mut numeric = false;
    let rendered = match field.root {
        FieldRoot::Date => {
            let text = match &field.format {
                FieldFormat::Date(items) => message.date().format(items)?,
                _ => format_default_date(message.date())?,
            };
            convert_text(text, field.conversion)
        }
        FieldRoot::Tags => convert_text(message.tags().to_string(), field.conversion),
        FieldRoot::TagSet => convert_text(TagList(message.tags()).to_string(), field.conversion),
        FieldRoot::Message => convert_text(message.to_string(), field.conversion),
        FieldRoot::Args | FieldRoot::Kwargs => match resolve(message, field)? {
            Resolved::Args(items) => ListDisplay(items).to_string(),
            Resolved::Kwargs(entries) => MapDisplay(entries).to_string(),
            Resolved::Value(value) => {
                numeric = matches!(value, Value::Int(_) | Value::UInt(_) | Value::Float(_));
                match field.conversion {
                    Conversion::Str => value.to_string(),
                    Conversion::Repr => value.repr().to_string(),
                }
            }
        },
    };

    match &field.format {
        FieldFormat::Padded(padding) => buffer.push_str(&apply_padding(&rendered, *padding, numeric)),
        FieldFormat::Plain | FieldFormat::Date(_) => buffer.push_str(&rendered),
    }
    Ok(())
}

fn resolve<'m>(message: &'m Message, field: &FieldToken) -> Result<Resolved<'m>, FormatError> {
    let mut keys = field.keys.iter();
    let Some(first) = keys.next() else {
        return Ok(match field.root {
            FieldRoot::Args => Resolved::Args(message.args()),
            _ => Resolved::Kwargs(message.kwargs()),
        });
    };

    let mut path = field.root.label().to_owned();
    let found = match (field.root, first) {
        (FieldRoot::Args, Key::Index(index)) => message.arg(*index),
        (FieldRoot::Args, Key::Name(_)) => None,
        (_, key) => message.kwarg(&key.to_string()),
    };
    let mut current = found.ok_or_else(|| FormatError::MissingKey {
        field: path.clone(),
        key: first.clone(),
    })?;
    path = format!("{path}[{first}]");

    for key in keys {
        if !current.is_container() {
            return Err(FormatError::NotIndexable { field: path });
        }
        current = current.get(key).ok_or_else(|| FormatError::MissingKey {
            field: path.clone(),
            key: key.clone(),
        })?;
        path = format!("{path}[{key}]");
    }

    Ok(Resolved::Value(current))
}

fn convert_text(text: String, conversion: Conversion) -> String {
    match conversion {
        Conversion::Str => text,
        Conversion::Repr => format!("{text:?}"),
    }
}

fn apply_padding(rendered: &str, padding: Padding, numeric: bool) -> String {
    let length = rendered.chars().count();
    if length >= padding.width {
        return rendered.to_owned();
    }

    let gap = padding.width - length;
    let align = padding
        .align
        .unwrap_or(if numeric { Align::Right } else { Align::Left });
    let (before, after) = match align {
        Align::Left => (0, gap),
        Align::Right => (gap, 0),
        Align::Center => (gap / 2, gap - gap / 2),
    };

    let mut padded = String::with_capacity(rendered.len() + gap * padding.fill.len_utf8());
    padded.extend(std::iter::repeat_n(padding.fill, before));
    padded.push_str(rendered);
    padded.extend(std::iter::repeat_n(padding.fill, after));
    padded
}

struct ListDisplay<'a>(&'a [Value]);

impl fmt::Display for ListDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.0)
    }
}

struct MapDisplay<'a>(&'a BTreeMap<String, Value>);

impl fmt::Display for MapDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, self.0)
    }
}

struct TagList<'a>(&'a Tags);

impl fmt::Display for TagList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (position, tag) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag:?}")?;
        }
        f.write_str("]")
    }
}
