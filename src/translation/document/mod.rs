/*!
 * Document models for the supported localization formats.
 *
 * - `line`: line-oriented `key: value` files (YAML-like localization tables)
 * - `tree`: attributed element trees (XML)
 */

pub mod line;
pub mod tree;

use std::path::Path;

use crate::errors::FormatError;

pub use line::{LineDocument, RawLine};
pub use tree::{Element, TreeDocument};

/// Structured format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// One entry per line, `key:value`
    Line,
    /// XML element tree
    Tree,
}

impl DocumentFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yml" | "yaml" | "txt" => Some(Self::Line),
            "xml" => Some(Self::Tree),
            _ => None,
        }
    }

    /// Detect format from path
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| FormatError::Unsupported(path.display().to_string()))
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" | "yml" | "yaml" => Ok(Self::Line),
            "tree" | "xml" => Ok(Self::Tree),
            other => Err(FormatError::Unsupported(other.to_string())),
        }
    }
}
