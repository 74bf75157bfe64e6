use crate::error::{Error, Result};
use crate::types::{Table, LINE_SEPARATOR};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

static UNSAFE_FILE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Receives the finished table of each parent group
pub trait RowSink {
    /// `label` is the group's declared name or tag, if any
    fn write_table(&mut self, label: Option<&str>, table: &Table) -> Result<()>;
}

/// Writes one timestamped CSV file per parent group into a directory
pub struct CsvSink {
    output_dir: PathBuf,
    /// Counter for groups without a label
    unnamed: usize,
    written: Vec<PathBuf>,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        if !output_dir.is_dir() {
            return Err(Error::config(format!(
                "output directory {} does not exist",
                output_dir.display()
            )));
        }
        Ok(CsvSink {
            output_dir: output_dir.to_path_buf(),
            unnamed: 0,
            written: Vec::new(),
        })
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn next_path(&mut self, label: Option<&str>) -> PathBuf {
        let label = match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => label.to_string(),
            None => {
                self.unnamed += 1;
                self.unnamed.to_string()
            }
        };
        self.output_dir.join(output_file_name(&label, &timestamp()))
    }
}

impl RowSink for CsvSink {
    fn write_table(&mut self, label: Option<&str>, table: &Table) -> Result<()> {
        let path = self.next_path(label);
        let file = std::fs::File::create(&path).map_err(|e| Error::io(&path, e))?;
        write_csv(file, table)?;

        log::info!("wrote {} rows to {}", table.rows.len(), path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Serialize `table` as CSV: the header, then one CRLF-terminated record per row
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    csv.write_record(&table.header)?;
    for row in &table.rows {
        csv.write_record(row.cells(&table.header))?;
    }
    csv.flush().map_err(|e| Error::Csv(e.into()))?;
    Ok(())
}

/// `<label>_<timestamp>.csv`, with characters unsafe in file names replaced
pub fn output_file_name(label: &str, timestamp: &str) -> String {
    let label = UNSAFE_FILE_CHARS.replace_all(label, "_");
    format!("{}_{}.csv", label, timestamp)
}

/// Local time as month, day, year, hours, minutes, seconds and microseconds
pub fn timestamp() -> String {
    chrono::Local::now().format("%m%d%Y%H%M%S%6f").to_string()
}

/// Prints rows as `column=value` pairs, one row per line
pub struct PrintSink<W: Write> {
    writer: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(writer: W) -> Self {
        PrintSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for PrintSink<W> {
    fn write_table(&mut self, _label: Option<&str>, table: &Table) -> Result<()> {
        if table.rows.is_empty() {
            return Ok(());
        }
        let lines: Vec<String> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();

        writeln!(self.writer, "{}", lines.join(LINE_SEPARATOR))
            .and_then(|_| self.writer.flush())
            .map_err(|e| Error::io("<output>", e))
    }
}
