//! Parser turning template strings into tokens.

use time::format_description;

use crate::error::TemplateError;
use crate::value::Key;

use super::tokens::{
    Align, Conversion, FieldFormat, FieldRoot, FieldToken, MAX_FIELD_WIDTH, Padding, TemplateToken,
};

/// Splits `text` into literal runs and replacement fields.
pub(super) fn parse_template(text: &str) -> Result<Vec<TemplateToken>, TemplateError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    literal.push('{');
                    continue;
                }

                // Brackets only group keys in the field name; after the
                // conversion or format separator they are plain characters.
                let mut field = String::new();
                let mut in_brackets = false;
                let mut in_format = false;
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    match inner {
                        '[' if !in_format => in_brackets = true,
                        ']' if !in_format => in_brackets = false,
                        '!' | ':' if !in_brackets => in_format = true,
                        '}' if !in_brackets => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                    field.push(inner);
                }
                if !closed {
                    return Err(TemplateError::UnclosedField(position));
                }

                if !literal.is_empty() {
                    tokens.push(TemplateToken::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(TemplateToken::Field(parse_field(&field)?));
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::StrayBrace(position));
                }
                literal.push('}');
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        tokens.push(TemplateToken::Literal(literal));
    }
    Ok(tokens)
}

enum Accessor<'a> {
    Attribute(&'a str),
    Item(&'a str),
}

fn parse_field(text: &str) -> Result<FieldToken, TemplateError> {
    let (name_part, conversion_part, spec_part) = split_field(text);

    let root_end = name_part.find(['.', '[']).unwrap_or(name_part.len());
    let root_name = &name_part[..root_end];
    if root_name.is_empty() || root_name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TemplateError::PositionalField(root_name.to_owned()));
    }
    let accessors = parse_accessors(name_part, &name_part[root_end..])?;

    let mut root = FieldRoot::from_name(root_name)
        .ok_or_else(|| TemplateError::UnknownField(root_name.to_owned()))?;
    let mut accessors = accessors.into_iter().peekable();

    if root == FieldRoot::Message {
        if let Some(Accessor::Attribute(attribute)) = accessors.peek() {
            root = FieldRoot::message_attribute(attribute).ok_or_else(|| {
                TemplateError::UnknownAttribute {
                    field: "message".to_owned(),
                    attribute: (*attribute).to_owned(),
                }
            })?;
            accessors.next();
        }
    }

    let mut keys = Vec::new();
    for accessor in accessors {
        match accessor {
            Accessor::Attribute(attribute) => {
                return Err(TemplateError::UnknownAttribute {
                    field: name_part.to_owned(),
                    attribute: attribute.to_owned(),
                });
            }
            Accessor::Item(key) => {
                if !root.is_indexable() {
                    return Err(TemplateError::NotIndexable(root.label().to_owned()));
                }
                keys.push(Key::parse(key));
            }
        }
    }

    let conversion = match conversion_part {
        None | Some("s") => Conversion::Str,
        Some("r") => Conversion::Repr,
        Some(other) => return Err(TemplateError::UnknownConversion(other.to_owned())),
    };

    let format = match spec_part {
        None | Some("") => FieldFormat::Plain,
        Some(spec) if root == FieldRoot::Date => parse_date_spec(spec)?,
        Some(spec) => FieldFormat::Padded(parse_padding(spec)?),
    };

    Ok(FieldToken {
        root,
        keys,
        conversion,
        format,
    })
}

/// Splits `name!conversion:spec`, ignoring separators inside `[...]`.
fn split_field(text: &str) -> (&str, Option<&str>, Option<&str>) {
    let mut in_brackets = false;
    let mut name_end = text.len();
    for (index, ch) in text.char_indices() {
        match ch {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            '!' | ':' if !in_brackets => {
                name_end = index;
                break;
            }
            _ => {}
        }
    }

    let name = &text[..name_end];
    let rest = &text[name_end..];
    if let Some(after_bang) = rest.strip_prefix('!') {
        match after_bang.split_once(':') {
            Some((conversion, spec)) => (name, Some(conversion), Some(spec)),
            None => (name, Some(after_bang), None),
        }
    } else if let Some(spec) = rest.strip_prefix(':') {
        (name, None, Some(spec))
    } else {
        (name, None, None)
    }
}

fn parse_accessors<'a>(field: &str, mut rest: &'a str) -> Result<Vec<Accessor<'a>>, TemplateError> {
    let malformed = || TemplateError::MalformedAccessor(field.to_owned());
    let mut accessors = Vec::new();

    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
            let attribute = &after_dot[..end];
            if attribute.is_empty() {
                return Err(malformed());
            }
            accessors.push(Accessor::Attribute(attribute));
            rest = &after_dot[end..];
        } else if let Some(after_open) = rest.strip_prefix('[') {
            let end = after_open.find(']').ok_or_else(malformed)?;
            let key = &after_open[..end];
            if key.is_empty() {
                return Err(malformed());
            }
            accessors.push(Accessor::Item(key));
            rest = &after_open[end + 1..];
        } else {
            return Err(malformed());
        }
    }

    Ok(accessors)
}

fn parse_date_spec(spec: &str) -> Result<FieldFormat, TemplateError> {
    format_description::parse_owned::<1>(spec)
        .map(FieldFormat::Date)
        .map_err(|error| TemplateError::InvalidSpec {
            spec: spec.to_owned(),
            reason: error.to_string(),
        })
}

/// Parses `[[fill]align][width]`.
fn parse_padding(spec: &str) -> Result<Padding, TemplateError> {
    let invalid = |reason: &str| TemplateError::InvalidSpec {
        spec: spec.to_owned(),
        reason: reason.to_owned(),
    };

    let mut chars = spec.chars();
    let first = chars.next();
    let second = chars.next();

    let (fill, align, width_text) = match (first, second) {
        (Some(fill), Some(marker)) if Align::from_char(marker).is_some() => {
            (fill, Align::from_char(marker), &spec[fill.len_utf8() + 1..])
        }
        (Some(marker), _) if Align::from_char(marker).is_some() => {
            (' ', Align::from_char(marker), &spec[1..])
        }
        _ => (' ', None, spec),
    };

    if width_text.is_empty() {
        return Err(invalid("missing width"));
    }
    if !width_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("only [[fill]align][width] is supported"));
    }
    let width = width_text
        .parse::<usize>()
        .map_err(|_| invalid("width out of range"))?;
    if width > MAX_FIELD_WIDTH {
        return Err(invalid("width exceeds 4096"));
    }

    Ok(Padding { fill, align, width })
}
