//! Building one output row from one matched parent element
//!
//! A cell may hold several matches: their texts are joined with the line
//! separator. A matched element that has sub-elements is flattened into
//! `name=text` pairs joined with commas, so one cell can carry a compact form
//! of repeated or nested structure.

use crate::extract::element::{Fragment, NodeId};
use crate::extract::path::Selected;
use crate::extract::plan::ColumnPlan;
use crate::types::{Row, LINE_SEPARATOR};

/// Extract every column of `columns` from `fragment`
pub fn build_row(fragment: &Fragment, columns: &[ColumnPlan]) -> Row {
    let mut row = Row::with_capacity(columns.len());
    for plan in columns {
        row.insert(plan.column.display_name.as_str(), field_text(fragment, plan));
    }
    row
}

/// The cell value for one column
pub fn field_text(fragment: &Fragment, plan: &ColumnPlan) -> String {
    let Some(path) = &plan.path else {
        return String::new();
    };
    let limit = plan.max_count.unwrap_or(usize::MAX);
    if limit == 0 {
        return String::new();
    }

    let texts: Vec<String> = path
        .select(fragment)
        .into_iter()
        .take(limit)
        .filter_map(|selected| match selected {
            Selected::Element(id) => element_text(fragment, id),
            Selected::Attribute(value) => Some(value.to_string()).filter(|v| !v.is_empty()),
        })
        .collect();
    texts.join(LINE_SEPARATOR)
}

/// Text of a leaf element, or the flattened `name=text` list of its children.
/// Leaves without text contribute nothing.
fn element_text(fragment: &Fragment, id: NodeId) -> Option<String> {
    let node = fragment.node(id);
    if !node.has_children() {
        return Some(node.text.clone()).filter(|t| !t.is_empty());
    }

    let pairs: Vec<String> = node
        .children
        .iter()
        .map(|&child| {
            let child = fragment.node(child);
            format!("{}={}", child.name.local, child.text)
        })
        .collect();
    Some(pairs.join(","))
}
