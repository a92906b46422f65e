//! Level classifier: derives a row's node values and hierarchy depth.

use crate::domain::entities::{ClassifiedRow, NodeData, Role, GROUP_SIZE};

/// Classify a row by the columns it populates.
///
/// Cells are scanned left to right and the first empty cell ends the record;
/// anything after it is ignored. Deeper groups overwrite the values of
/// shallower ones, so the result carries the deepest populated group.
///
/// The depth is the number of column groups the scan covered. A row that
/// stops inside its first group counts one column less, which turns a lone
/// label into depth 0.
pub fn classify(row: &[String]) -> ClassifiedRow {
    let mut data = NodeData::default();
    let mut column_no = 0;

    for cell in row {
        column_no += 1;
        if cell.is_empty() {
            break;
        }
        data.set(Role::for_column(column_no), cell);
    }

    if column_no < GROUP_SIZE {
        column_no = column_no.saturating_sub(1);
    }

    ClassifiedRow {
        data,
        depth: column_no / GROUP_SIZE,
    }
}
