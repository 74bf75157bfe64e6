use crate::error::{Error, Result};
use crate::spec::model::{RawSpecification, Specification};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up when the specification path is a directory
pub const DEFAULT_SPEC_FILE_NAME: &str = "specs.json";

impl Specification {
    /// Load and validate a specification from a JSON file, or from
    /// `specs.json` inside a directory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let spec_file = resolve_spec_path(path)?;
        log::debug!("loading specification from {}", spec_file.display());

        let content = fs::read_to_string(&spec_file).map_err(|e| {
            Error::config(format!(
                "cannot read specification {}: {}",
                spec_file.display(),
                e
            ))
        })?;

        Self::from_json_str(&content, spec_file.parent())
    }

    /// Parse and validate a specification held in memory
    pub fn from_json_str(json: &str, base_dir: Option<&Path>) -> Result<Self> {
        let raw: RawSpecification = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("malformed specification: {}", e)))?;
        Specification::from_raw(raw, base_dir)
    }

    /// Validate an already-parsed JSON value
    pub fn from_json_value(value: serde_json::Value, base_dir: Option<&Path>) -> Result<Self> {
        let raw: RawSpecification = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("malformed specification: {}", e)))?;
        Specification::from_raw(raw, base_dir)
    }
}

fn resolve_spec_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::config("specification path is mandatory"));
    }
    if path.is_dir() {
        let candidate = path.join(DEFAULT_SPEC_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        return Err(Error::config(format!(
            "{} does not contain {}",
            path.display(),
            DEFAULT_SPEC_FILE_NAME
        )));
    }
    resolve_existing_file(path).ok_or_else(|| {
        Error::config(format!(
            "{} should be a specification file or a directory containing {}",
            path.display(),
            DEFAULT_SPEC_FILE_NAME
        ))
    })
}

/// Find `input_file`, trying the working directory first and then the
/// specification's directory for relative paths.
pub(crate) fn locate_input_file(input_file: &str, base_dir: Option<&Path>) -> Option<PathBuf> {
    let path = Path::new(input_file);
    if let Some(found) = resolve_existing_file(path) {
        return Some(found);
    }
    match base_dir {
        Some(dir) if path.is_relative() => resolve_existing_file(&dir.join(path)),
        _ => None,
    }
}

/// Returns the path of an existing regular file.
///
/// A path without an extension also matches a file in the same directory
/// whose stem is the path's file name, provided exactly one does.
pub(crate) fn resolve_existing_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if path.extension().is_some() {
        return None;
    }

    let name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut matches = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|candidate| candidate.is_file() && candidate.file_stem() == Some(name));

    let first = matches.next()?;
    match matches.next() {
        Some(_) => None,
        None => Some(first),
    }
}
