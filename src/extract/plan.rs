//! Pre-computed extraction plans
//!
//! A plan resolves everything that does not depend on the document - column
//! names, compiled paths, filters, the parent pattern - once per parent group,
//! so that the streaming loop makes no decisions from raw specification keys.

use crate::error::{Error, Result};
use crate::extract::filter::RowFilter;
use crate::extract::path::{self, LocationPath, ParentPattern};
use crate::extract::window::Window;
use crate::spec::{FieldSpec, ParentGroup, Specification};
use crate::types::ResolvedColumn;
use std::collections::HashSet;
use std::path::PathBuf;

/// How to extract one column
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    pub column: ResolvedColumn,

    /// None when the field path is empty; such a column is always empty
    pub path: Option<LocationPath>,

    /// Maximum number of matches joined into the cell (None = unbounded)
    pub max_count: Option<usize>,
}

/// Everything needed to extract one parent group
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    /// Declared `name`, else `tag_name`
    pub label: Option<String>,

    pub input_file: PathBuf,

    /// Namespace-qualified parent expression, as matched
    pub parent_expression: String,
    pub parent: ParentPattern,

    pub columns: Vec<ColumnPlan>,
    pub filter: Option<RowFilter>,

    pub start_from: u64,
    pub max_count: Option<u64>,
}

impl ExtractionPlan {
    /// Compile the plan for `group`; None for groups without children
    pub fn for_group(spec: &Specification, group: &ParentGroup) -> Result<Option<Self>> {
        if group.is_empty() {
            return Ok(None);
        }

        let namespace = spec.namespace.as_deref();
        let tag_name = group
            .tag_name
            .as_deref()
            .ok_or_else(|| Error::config("Parent tag_name is mandatory"))?;
        let parent_expression = path::resolve(namespace, tag_name)
            .ok_or_else(|| Error::config("Parent tag_name is mandatory"))?;
        let parent = ParentPattern::compile(&parent_expression)?;

        let resolved = resolve_columns(&group.children);
        warn_on_duplicates(&resolved, tag_name);

        let columns = group
            .children
            .iter()
            .zip(resolved)
            .map(|(field, column)| {
                let path = match path::resolve(namespace, field.xpath.trim()) {
                    Some(expr) => Some(LocationPath::compile(&expr)?),
                    None => None,
                };
                Ok(ColumnPlan {
                    column,
                    path,
                    max_count: field.max_count,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let filter = RowFilter::from_rules(columns.iter().zip(&group.children).filter_map(
            |(plan, field)| {
                field
                    .filter
                    .as_deref()
                    .map(|values| (plan.column.display_name.as_str(), values))
            },
        ));

        log::debug!(
            "planned group {:?}: parent {:?}, {} columns, filtered: {}",
            tag_name,
            parent_expression,
            columns.len(),
            filter.is_some()
        );

        Ok(Some(ExtractionPlan {
            label: group.name.clone().or_else(|| group.tag_name.clone()),
            input_file: spec.input_file.clone(),
            parent_expression,
            parent,
            columns,
            filter,
            start_from: spec.start_from,
            max_count: spec.max_count,
        }))
    }

    /// Column names in declaration order
    pub fn header(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.column.display_name.clone())
            .collect()
    }

    /// A fresh pagination window for one run of this plan
    pub fn window(&self) -> Window {
        Window::new(self.start_from, self.max_count)
    }
}

/// Display names for `fields`, falling back to "1", "2", ... for fields whose
/// name cannot be derived
pub fn resolve_columns(fields: &[FieldSpec]) -> Vec<ResolvedColumn> {
    let mut fallback = 0;
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let display_name = path::derive_name(field).unwrap_or_else(|| {
                fallback += 1;
                fallback.to_string()
            });
            ResolvedColumn {
                index,
                display_name,
            }
        })
        .collect()
}

fn warn_on_duplicates(columns: &[ResolvedColumn], group: &str) {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.display_name.as_str()) {
            log::warn!(
                "group {:?}: column {:?} is declared more than once; the last value wins",
                group,
                column.display_name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn spec(value: serde_json::Value) -> (tempfile::NamedTempFile, Specification) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<root/>").unwrap();
        let mut value = value;
        value["input_file"] = json!(file.path());
        let spec = Specification::from_json_value(value, None).unwrap();
        (file, spec)
    }

    #[test]
    fn test_header_follows_declaration_order() {
        let (_file, spec) = spec(json!({
            "root": {"parent": [{"tag_name": "item", "children": [
                {"xpath": "b/price"},
                {"xpath": "a", "name": "Alpha"},
                {"xpath": "*"},
                {"xpath": "c", "tag_name": "Gamma"},
                {"xpath": ".."}
            ]}]}
        }));
        let plan = ExtractionPlan::for_group(&spec, &spec.groups[0]).unwrap().unwrap();

        assert_eq!(plan.header(), vec!["price", "Alpha", "1", "Gamma", "2"]);
        assert!(plan.filter.is_none());
        assert_eq!(plan.label.as_deref(), Some("item"));
    }

    #[test]
    fn test_group_without_children_has_no_plan() {
        let (_file, spec) = spec(json!({
            "root": {"parent": [{"name": "nothing"}]}
        }));
        assert!(ExtractionPlan::for_group(&spec, &spec.groups[0]).unwrap().is_none());
    }

    #[test]
    fn test_namespace_applies_to_parent_and_fields() {
        let (_file, spec) = spec(json!({
            "namespace": "urn:x",
            "root": {"parent": [{"tag_name": "item", "name": "items", "children": [
                {"xpath": "price", "filter": ["1"]}
            ]}]}
        }));
        let plan = ExtractionPlan::for_group(&spec, &spec.groups[0]).unwrap().unwrap();

        assert_eq!(plan.parent_expression, "{urn:x}item");
        assert_eq!(plan.label.as_deref(), Some("items"));
        assert!(plan.filter.is_some());
    }

    #[test]
    fn test_empty_xpath_compiles_to_no_path() {
        let (_file, spec) = spec(json!({
            "root": {"parent": [{"tag_name": "item", "children": [{"xpath": "  "}]}]}
        }));
        let plan = ExtractionPlan::for_group(&spec, &spec.groups[0]).unwrap().unwrap();

        assert!(plan.columns[0].path.is_none());
        assert_eq!(plan.header(), vec!["1"]);
    }

    #[test]
    fn test_invalid_field_path_is_configuration_error() {
        let (_file, spec) = spec(json!({
            "root": {"parent": [{"tag_name": "item", "children": [{"xpath": "a[@"}]}]}
        }));
        let err = ExtractionPlan::for_group(&spec, &spec.groups[0]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_window_comes_from_specification() {
        let (_file, spec) = spec(json!({
            "start_from": 2,
            "max_count": 1,
            "root": {"parent": [{"tag_name": "item", "children": [{"xpath": "a"}]}]}
        }));
        let plan = ExtractionPlan::for_group(&spec, &spec.groups[0]).unwrap().unwrap();
        let mut window = plan.window();

        assert!(window.should_skip());
        assert!(!window.should_skip());
    }
}
