use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading a specification or converting a document
#[derive(Debug, Error)]
pub enum Error {
    /// Anything wrong with the specification, its paths or the output location.
    /// Always raised before streaming starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {source_name} at byte {position}: {source}")]
    Xml {
        source_name: String,
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the specification rather than from the data
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfiguration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
