//! # xml2csv - Specification-driven XML to CSV extraction
//!
//! Streams an XML document and turns every occurrence of a "parent" element
//! into one CSV row, with columns declared in a JSON specification.
//!
//! ## Modules
//!
//! - **spec**: load and validate the JSON specification
//! - **extract**: stream the document, evaluate field paths, filter and paginate rows
//!
//! ## Quick Start
//!
//! A specification names the input file and, per parent element, the fields
//! to extract:
//!
//! ```json
//! {
//!   "input_file": "catalog.xml",
//!   "start_from": 1,
//!   "max_count": 100,
//!   "root": {
//!     "parent": [
//!       {"tag_name": "item", "name": "items", "children": [
//!         {"xpath": "price", "filter": ["20", "30"]},
//!         {"xpath": "meta", "name": "details"}
//!       ]}
//!     ]
//!   }
//! }
//! ```
//!
//! ```rust,no_run
//! use xml2csv::{xml_to_csv, Output};
//!
//! # fn main() -> anyhow::Result<()> {
//! let report = xml_to_csv("specs.json", Output::Csv { dir: "out".into() })?;
//! for group in &report.groups {
//!     println!("{:?}: {:?}", group.label, group.result);
//! }
//! # Ok(())
//! # }
//! ```

use std::io::BufRead;
use std::path::{Path, PathBuf};

pub mod error;
pub mod extract;
pub mod extractor;
pub mod spec;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use extract::{CsvSink, ExtractionPlan, PrintSink, RowSink};
pub use extractor::XmlExtractor;
pub use spec::{FieldSpec, ParentGroup, Specification};
pub use types::{Row, Table};

/// Where converted rows go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// One timestamped CSV file per parent group in `dir`
    Csv { dir: PathBuf },
    /// `column=value` lines on stdout
    Print,
}

impl Default for Output {
    fn default() -> Self {
        Output::Csv {
            dir: default_output_dir(),
        }
    }
}

/// The user's home directory, else the working directory
pub fn default_output_dir() -> PathBuf {
    let home = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(home)
        .map(PathBuf::from)
        .filter(|p| p.is_dir())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Outcome of one parent group
#[derive(Debug)]
pub struct GroupReport {
    pub label: Option<String>,
    pub parent_expression: String,
    /// Rows handed to the sink, or why the group was abandoned
    pub result: Result<usize>,
}

#[derive(Debug, Default)]
pub struct ConversionReport {
    pub groups: Vec<GroupReport>,
}

impl ConversionReport {
    pub fn rows_written(&self) -> usize {
        self.groups
            .iter()
            .filter_map(|g| g.result.as_ref().ok())
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &GroupReport> {
        self.groups.iter().filter(|g| g.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs every parent group of a specification against its input document
pub struct Converter {
    spec: Specification,
}

impl Converter {
    pub fn new(spec: Specification) -> Self {
        Converter { spec }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Converter::new(Specification::from_path(path)?))
    }

    pub fn specification(&self) -> &Specification {
        &self.spec
    }

    /// Compile a plan for every group that declares fields.
    ///
    /// Plans are built up front so that a configuration error in any group
    /// is reported before the document is read.
    pub fn plans(&self) -> Result<Vec<ExtractionPlan>> {
        let mut plans = Vec::with_capacity(self.spec.groups.len());
        for (position, group) in self.spec.groups.iter().enumerate() {
            match ExtractionPlan::for_group(&self.spec, group)? {
                Some(plan) => plans.push(plan),
                None => log::debug!("parent #{} declares no fields, skipped", position + 1),
            }
        }
        Ok(plans)
    }

    /// Extract every group into `sink`.
    ///
    /// Configuration errors are returned; a group that fails while streaming
    /// or writing is logged and recorded in the report, and the next group
    /// still runs.
    pub fn run_with_sink<S: RowSink>(&self, sink: &mut S) -> Result<ConversionReport> {
        let plans = self.plans()?;
        let mut report = ConversionReport::default();

        for plan in &plans {
            let result = XmlExtractor::new(plan).extract().and_then(|table| {
                sink.write_table(plan.label.as_deref(), &table)?;
                Ok(table.rows.len())
            });
            if let Err(e) = &result {
                log::warn!("group {:?} failed: {}", plan.parent_expression, e);
            }
            report.groups.push(GroupReport {
                label: plan.label.clone(),
                parent_expression: plan.parent_expression.clone(),
                result,
            });
        }

        Ok(report)
    }

    pub fn run(&self, output: &Output) -> Result<ConversionReport> {
        match output {
            Output::Csv { dir } => self.run_with_sink(&mut CsvSink::new(dir)?),
            Output::Print => self.run_with_sink(&mut PrintSink::new(std::io::stdout())),
        }
    }

    /// Extract every group from an already-open document into a table each
    pub fn tables_from_reader<R: BufRead + Clone>(&self, reader: R) -> Result<Vec<Table>> {
        self.plans()?
            .iter()
            .map(|plan| XmlExtractor::new(plan).extract_from_reader(reader.clone()))
            .collect()
    }
}

/// Main entry point: convert the document named by the specification at
/// `spec_path` (a JSON file or a directory holding `specs.json`)
pub fn xml_to_csv<P: AsRef<Path>>(spec_path: P, output: Output) -> Result<ConversionReport> {
    Converter::from_path(spec_path)?.run(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    const CATALOG: &str = "<catalog>\
        <item><price>10</price><meta><a>x</a><b>y</b></meta></item>\
        <item><price>20</price></item>\
        <item><price>30</price></item>\
        <vendor id=\"v1\"><name>Acme</name></vendor>\
        </catalog>";

    fn write_spec(dir: &Path, spec: serde_json::Value) -> PathBuf {
        let path = dir.join("specs.json");
        fs::write(&path, spec.to_string()).unwrap();
        path
    }

    fn csv_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|e| e == "csv"))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_every_group_gets_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("catalog.xml"), CATALOG).unwrap();
        write_spec(
            dir.path(),
            json!({
                "input_file": dir.path().join("catalog.xml"),
                "root": {"parent": [
                    {"tag_name": "item", "name": "items", "children": [
                        {"xpath": "price"},
                        {"xpath": "meta"}
                    ]},
                    {"tag_name": "vendor", "children": [
                        {"xpath": "@id", "name": "id"},
                        {"xpath": "name"}
                    ]},
                    {"name": "placeholder"}
                ]}
            }),
        );

        let report = xml_to_csv(dir.path(), Output::Csv { dir: dir.path().to_path_buf() }).unwrap();
        assert!(report.is_success());
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.rows_written(), 4);

        let files = csv_files(dir.path());
        assert_eq!(files.len(), 2);
        let items = files
            .iter()
            .find(|p| p.file_name().unwrap().to_str().unwrap().starts_with("items_"))
            .unwrap();
        let content = fs::read_to_string(items).unwrap();
        assert_eq!(content, "price,meta\r\n10,\"a=x,b=y\"\r\n20,\r\n30,\r\n");

        let vendors = files
            .iter()
            .find(|p| p.file_name().unwrap().to_str().unwrap().starts_with("vendor_"))
            .unwrap();
        assert_eq!(fs::read_to_string(vendors).unwrap(), "id,name\r\nv1,Acme\r\n");
    }

    #[test]
    fn test_configuration_errors_come_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("catalog.xml"), CATALOG).unwrap();
        write_spec(
            dir.path(),
            json!({
                "input_file": dir.path().join("catalog.xml"),
                "root": {"parent": [
                    {"tag_name": "item", "children": [{"xpath": "price"}]},
                    {"tag_name": "vendor", "children": [{"xpath": "name[@"}]}
                ]}
            }),
        );

        let err = xml_to_csv(dir.path(), Output::Csv { dir: dir.path().to_path_buf() }).unwrap_err();
        assert!(err.is_configuration());
        assert!(csv_files(dir.path()).is_empty());
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("catalog.xml"), CATALOG).unwrap();
        let spec = write_spec(
            dir.path(),
            json!({
                "input_file": dir.path().join("catalog.xml"),
                "root": {"parent": [{"tag_name": "item", "children": [{"xpath": "price"}]}]}
            }),
        );

        let err = xml_to_csv(spec, Output::Csv { dir: dir.path().join("missing") }).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_failing_group_does_not_stop_the_next() {
        // the first group reads to the end and hits the broken markup, the
        // second stops after its first row
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("broken.xml"),
            "<catalog><item><price>1</price></item><oops></catalog>",
        )
        .unwrap();
        write_spec(
            dir.path(),
            json!({
                "input_file": dir.path().join("broken.xml"),
                "max_count": 1,
                "root": {"parent": [
                    {"tag_name": "missing", "children": [{"xpath": "x"}]},
                    {"tag_name": "item", "children": [{"xpath": "price"}]}
                ]}
            }),
        );

        let converter = Converter::from_path(dir.path()).unwrap();
        let mut sink = PrintSink::new(Vec::new());
        let report = converter.run_with_sink(&mut sink).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
        assert!(matches!(report.groups[0].result, Err(Error::Xml { .. })));
        assert_eq!(report.groups[1].result.as_ref().ok(), Some(&1));
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "price=1\n");
    }

    struct RejectingSink {
        calls: usize,
    }

    impl RowSink for RejectingSink {
        fn write_table(&mut self, _label: Option<&str>, _table: &Table) -> Result<()> {
            self.calls += 1;
            if self.calls == 1 {
                return Err(Error::io("sink", std::io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("catalog.xml"), CATALOG).unwrap();
        write_spec(
            dir.path(),
            json!({
                "input_file": dir.path().join("catalog.xml"),
                "root": {"parent": [
                    {"tag_name": "item", "children": [{"xpath": "price"}]},
                    {"tag_name": "vendor", "children": [{"xpath": "name"}]}
                ]}
            }),
        );

        let converter = Converter::from_path(dir.path()).unwrap();
        let mut sink = RejectingSink { calls: 0 };
        let report = converter.run_with_sink(&mut sink).unwrap();

        assert_eq!(sink.calls, 2);
        assert!(report.groups[0].result.is_err());
        assert_eq!(report.rows_written(), 1);
    }

    #[test]
    fn test_tables_from_reader() {
        let spec = Specification::from_json_value(
            json!({
                "input_file": file!(),
                "start_from": 2,
                "root": {"parent": [{"tag_name": "item", "children": [{"xpath": "price"}]}]}
            }),
            None,
        )
        .unwrap();

        let tables = Converter::new(spec).tables_from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(tables.len(), 1);
        let prices: Vec<&str> = tables[0].rows.iter().map(|r| r.get("price").unwrap()).collect();
        assert_eq!(prices, vec!["20", "30"]);
    }
}
