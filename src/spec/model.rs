//! Typed view of the extraction specification
//!
//! The JSON document is deserialized into loosely-typed `Raw*` structs first and
//! then validated into [`Specification`]. Extraction code only ever sees the
//! validated types.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Accepts either a single value or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

/// A filter value as written in JSON; compared by its textual form
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Counts may be written as numbers or numeric strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Count {
    Integer(i64),
    Text(String),
}

impl Count {
    fn value(&self, what: &str) -> Result<i64> {
        match self {
            Count::Integer(i) => Ok(*i),
            Count::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("{} must be an integer, got {:?}", what, s))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSpecification {
    input_file: Option<String>,
    root: Option<RawRoot>,
    namespace: Option<String>,
    start_from: Option<Count>,
    max_count: Option<Count>,
}

#[derive(Debug, Deserialize)]
struct RawRoot {
    parent: Option<OneOrMany<RawParentGroup>>,
}

#[derive(Debug, Deserialize)]
struct RawParentGroup {
    tag_name: Option<String>,
    name: Option<String>,
    children: Option<Vec<RawFieldSpec>>,
}

#[derive(Debug, Deserialize)]
struct RawFieldSpec {
    xpath: Option<String>,
    name: Option<String>,
    tag_name: Option<String>,
    max_count: Option<Count>,
    filter: Option<OneOrMany<Scalar>>,
}

/// The validated specification: one input document, one or more parent groups
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    /// Existing XML file to read
    pub input_file: PathBuf,

    /// Parent groups in declaration order
    pub groups: Vec<ParentGroup>,

    /// Namespace URI applied to bare path segments
    pub namespace: Option<String>,

    /// 1-based index of the first raw match to extract
    pub start_from: u64,

    /// Maximum number of admitted rows per group (None = unbounded)
    pub max_count: Option<u64>,
}

/// One extraction unit, producing one output
#[derive(Debug, Clone, PartialEq)]
pub struct ParentGroup {
    /// Parent match expression; always present when `children` is non-empty
    pub tag_name: Option<String>,
    pub name: Option<String>,
    pub children: Vec<FieldSpec>,
}

impl ParentGroup {
    /// Groups without children produce no output at all
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// One output column
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Path relative to the parent element
    pub xpath: String,
    pub name: Option<String>,
    pub tag_name: Option<String>,

    /// Maximum number of matched nodes joined into the cell (None = unbounded)
    pub max_count: Option<usize>,

    /// Accepted values; None when the field does not gate admission
    pub filter: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(xpath: impl Into<String>) -> Self {
        FieldSpec {
            xpath: xpath.into(),
            name: None,
            tag_name: None,
            max_count: None,
            filter: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_filter<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.filter = if values.is_empty() { None } else { Some(values) };
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Specification {
    /// Validate a raw specification.
    ///
    /// `base_dir` is the directory of the specification file; a relative
    /// `input_file` not found from the working directory is looked up there.
    pub(crate) fn from_raw(raw: RawSpecification, base_dir: Option<&Path>) -> Result<Self> {
        let (Some(input_file), Some(root)) = (non_blank(raw.input_file), raw.root) else {
            return Err(Error::config(
                "input_file, root and parent are mandatory tags in the specification",
            ));
        };
        let parents = root.parent.map(OneOrMany::into_vec).unwrap_or_default();
        if parents.is_empty() {
            return Err(Error::config(
                "input_file, root and parent are mandatory tags in the specification",
            ));
        }

        let input_file = super::loader::locate_input_file(&input_file, base_dir)
            .ok_or_else(|| Error::config(format!("input_file - {} not found", input_file)))?;

        let start_from = match raw.start_from {
            Some(count) => {
                let value = count.value("start_from")?;
                if value < 1 {
                    return Err(Error::config(format!(
                        "start_from must be 1 or greater, got {}",
                        value
                    )));
                }
                value as u64
            }
            None => 1,
        };
        let max_count = match raw.max_count {
            Some(count) => u64::try_from(count.value("max_count")?).ok(),
            None => None,
        };

        let groups = parents
            .into_iter()
            .enumerate()
            .map(|(idx, group)| ParentGroup::from_raw(group, idx + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Specification {
            input_file,
            groups,
            namespace: non_blank(raw.namespace),
            start_from,
            max_count,
        })
    }

    /// Override the window settings, e.g. from command-line flags
    pub fn with_window(mut self, start_from: Option<u64>, max_count: Option<i64>) -> Result<Self> {
        if let Some(start) = start_from {
            if start < 1 {
                return Err(Error::config("start_from must be 1 or greater"));
            }
            self.start_from = start;
        }
        if let Some(max) = max_count {
            self.max_count = u64::try_from(max).ok();
        }
        Ok(self)
    }
}

impl ParentGroup {
    fn from_raw(raw: RawParentGroup, position: usize) -> Result<Self> {
        let children = raw.children.unwrap_or_default();
        let tag_name = non_blank(raw.tag_name);

        if !children.is_empty() && tag_name.is_none() {
            return Err(Error::config(format!(
                "Parent tag_name is mandatory (parent #{})",
                position
            )));
        }

        let children = children
            .into_iter()
            .enumerate()
            .map(|(idx, field)| FieldSpec::from_raw(field, position, idx + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(ParentGroup {
            tag_name,
            name: non_blank(raw.name),
            children,
        })
    }
}

impl FieldSpec {
    fn from_raw(raw: RawFieldSpec, parent: usize, position: usize) -> Result<Self> {
        let xpath = raw.xpath.ok_or_else(|| {
            Error::config(format!(
                "Child xpath is mandatory (parent #{}, child #{})",
                parent, position
            ))
        })?;

        // negative counts mean "no limit"
        let max_count = match raw.max_count {
            Some(count) => usize::try_from(count.value("max_count")?).ok(),
            None => None,
        };

        // a bare "" declares no filter; inside a list "" accepts empty values
        let filter = match raw.filter {
            Some(OneOrMany::One(Scalar::Text(text))) if text.is_empty() => None,
            Some(values) => Some(
                values
                    .into_vec()
                    .into_iter()
                    .map(Scalar::into_text)
                    .collect::<Vec<_>>(),
            ),
            None => None,
        };

        Ok(FieldSpec {
            xpath,
            name: raw.name,
            tag_name: raw.tag_name,
            max_count,
            filter: filter.filter(|values| !values.is_empty()),
        })
    }
}
