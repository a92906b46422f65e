//! JSON rendering: an array of nested objects with a 4-space indent.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::application::render::{render_error, Format};
use crate::application::ApplicationResult;
use crate::domain::TreeNode;

const INDENT: &[u8] = b"    ";

pub fn render(forest: &[TreeNode]) -> ApplicationResult<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    forest
        .serialize(&mut serializer)
        .map_err(|e| render_error(Format::Json, e))?;
    String::from_utf8(buf).map_err(|e| render_error(Format::Json, e))
}

/// Parse rendered JSON back into the owned tree view.
pub fn parse(text: &str) -> ApplicationResult<Vec<TreeNode>> {
    serde_json::from_str(text).map_err(|e| render_error(Format::Json, e))
}
