//! Token definitions backing template parsing and rendering.

use time::format_description::OwnedFormatItem;

use crate::value::Key;

/// Maximum width accepted for field padding.
pub(super) const MAX_FIELD_WIDTH: usize = 4096;

#[derive(Clone, Debug)]
pub(super) enum TemplateToken {
    Literal(String),
    Field(FieldToken),
}

/// Parsed replacement field together with its rendering controls.
#[derive(Clone, Debug)]
pub(super) struct FieldToken {
    /// Which part of the message the field reads.
    pub(super) root: FieldRoot,
    /// `[key]` lookups applied after the root, outermost first.
    pub(super) keys: Vec<Key>,
    /// `!s` / `!r` conversion.
    pub(super) conversion: Conversion,
    /// Format spec following `:`.
    pub(super) format: FieldFormat,
}

/// Message parts addressable from a template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum FieldRoot {
    /// `{date}` and `{message.date}`.
    Date,
    /// `{tags}`, rendered space-joined.
    Tags,
    /// `{message.tags}`, rendered as a quoted list.
    TagSet,
    /// `{args}` and `{message.args}`.
    Args,
    /// `{kwargs}` and `{message.kwargs}`.
    Kwargs,
    /// `{message}`.
    Message,
}

impl FieldRoot {
    pub(super) fn from_name(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Self::Date),
            "tags" => Some(Self::Tags),
            "args" => Some(Self::Args),
            "kwargs" => Some(Self::Kwargs),
            "message" => Some(Self::Message),
            _ => None,
        }
    }

    /// Resolves `message.<attribute>`.
    pub(super) fn message_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "date" => Some(Self::Date),
            "tags" => Some(Self::TagSet),
            "args" => Some(Self::Args),
            "kwargs" => Some(Self::Kwargs),
            _ => None,
        }
    }

    pub(super) const fn is_indexable(self) -> bool {
        matches!(self, Self::Args | Self::Kwargs)
    }

    pub(super) const fn label(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Tags => "tags",
            Self::TagSet => "message.tags",
            Self::Args => "args",
            Self::Kwargs => "kwargs",
            Self::Message => "message",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(super) enum Conversion {
    #[default]
    Str,
    Repr,
}

#[derive(Clone, Debug, Default)]
pub(super) enum FieldFormat {
    #[default]
    Plain,
    Padded(Padding),
    Date(OwnedFormatItem),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct Padding {
    pub(super) fill: char,
    /// `None` picks the natural alignment: right for numbers, left otherwise.
    pub(super) align: Option<Align>,
    pub(super) width: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    pub(super) const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '<' => Some(Self::Left),
            '>' => Some(Self::Right),
            '^' => Some(Self::Center),
            _ => None,
        }
    }
}
