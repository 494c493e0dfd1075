/// Controls whether a [`WriterDestination`](crate::WriterDestination) terminates each entry with a newline.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineMode {
    /// Append a newline unless the formatted text already ends with one.
    #[default]
    WithNewline,
    /// Write the formatted text exactly as produced.
    WithoutNewline,
}

impl LineMode {
    /// Reports whether the mode terminates entries with a newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use taglog::LineMode;
    ///
    /// assert!(LineMode::WithNewline.append_newline());
    /// assert!(!LineMode::WithoutNewline.append_newline());
    /// ```
    #[must_use]
    pub const fn append_newline(self) -> bool {
        matches!(self, Self::WithNewline)
    }

    /// Returns the bytes to write after `formatted` to honour the mode.
    pub(crate) fn terminator(self, formatted: &str) -> &'static [u8] {
        if self.append_newline() && !formatted.ends_with('\n') {
            b"\n"
        } else {
            b""
        }
    }
}

impl From<bool> for LineMode {
    /// `true` maps to [`LineMode::WithNewline`], `false` to [`LineMode::WithoutNewline`].
    fn from(append_newline: bool) -> Self {
        if append_newline {
            Self::WithNewline
        } else {
            Self::WithoutNewline
        }
    }
}

impl From<LineMode> for bool {
    fn from(mode: LineMode) -> Self {
        mode.append_newline()
    }
}

#[cfg(test)]
mod tests;
