//! Serializers: render a forest as XML, JSON or a terminal tree.

pub mod json;
pub mod tree;
pub mod xml;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::ForestArena;

/// Output format of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Nested `item` elements, fields as child elements
    Xml,
    /// Array of nested objects, 4-space indent
    #[default]
    Json,
    /// Human-readable preview, one line per node
    Tree,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Xml, Format::Json, Format::Tree];

    /// Render `forest` in this format. Pure: no state shared between calls.
    pub fn render(self, forest: &ForestArena) -> ApplicationResult<String> {
        match self {
            Format::Xml => xml::render(&forest.to_tree_nodes()),
            Format::Json => json::render(&forest.to_tree_nodes()),
            Format::Tree => Ok(tree::render(forest)),
        }
    }

    /// Infer the format from an output file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Format::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// File extension used for derived output paths.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Tree => "txt",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Tree => "tree",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown format '{}', expected one of: xml, json, tree", s))
    }
}

pub(crate) fn render_error(format: Format, e: impl fmt::Display) -> ApplicationError {
    ApplicationError::Render {
        format: format.to_string(),
        message: e.to_string(),
    }
}
