//! Line-oriented localization files.
//!
//! Each line is either a `key:value` pair, split on the first colon, or
//! anything else (comments, headers, blank lines) which passes through as-is.

use crate::errors::FormatError;

const BOM: char = '\u{feff}';

/// A physical line with its terminator kept apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Line content without the terminator
    pub content: String,
    /// `"\n"`, `"\r\n"` or empty for a final unterminated line
    pub terminator: String,
}

impl RawLine {
    /// Split on the first colon; `None` for non-pair lines
    pub fn split_pair(&self) -> Option<(&str, &str)> {
        self.content.split_once(':')
    }
}

/// Ordered lines of a line-oriented file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDocument {
    pub lines: Vec<RawLine>,
}

impl LineDocument {
    /// Decode UTF-8 input, dropping a leading byte-order mark
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let text = std::str::from_utf8(bytes).map_err(|e| FormatError::Encoding(e.to_string()))?;
        Ok(Self::parse_str(text))
    }

    pub fn parse_str(text: &str) -> Self {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let lines = text
            .split_inclusive('\n')
            .map(|line| {
                let (content, terminator) = match line.strip_suffix("\r\n") {
                    Some(content) => (content, "\r\n"),
                    None => match line.strip_suffix('\n') {
                        Some(content) => (content, "\n"),
                        None => (line, ""),
                    },
                };
                RawLine {
                    content: content.to_string(),
                    terminator: terminator.to_string(),
                }
            })
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Encode as UTF-8 with a byte-order mark
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push(BOM);
        for line in &self.lines {
            out.push_str(&line.content);
            out.push_str(&line.terminator);
        }
        out.into_bytes()
    }
}
