//! Error types shared by the evidence readers and record adapters
//!

use camino::Utf8PathBuf;
use thiserror::Error;

/// A two-interval record which can't be converted into breakpoint evidence
///
/// The caller decides whether this aborts the run or the record is skipped.
///
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedEvidenceRecord {
    #[error("record has {0} columns, at least 10 are required")]
    TooFewColumns(usize),

    #[error("invalid {field} value '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("invalid strand '{0}', expected '+' or '-'")]
    InvalidStrand(String),

    #[error("no TYPE field")]
    MissingType,

    #[error("TYPE \"{0}\" not supported (DELETION,DUPLICATION,INVERSION)")]
    UnsupportedType(String),

    #[error("conflicting TYPE fields \"{0}\" and \"{1}\"")]
    ConflictingType(String, String),
}

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("alignment file error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error("malformed evidence record at {path}:{line}: {source}")]
    MalformedRecord {
        path: Utf8PathBuf,
        line: usize,
        source: MalformedEvidenceRecord,
    },

    #[error("invalid insert size histogram '{path}': {message}")]
    Histogram { path: Utf8PathBuf, message: String },

    #[error("invalid insert size distribution: {0}")]
    Distribution(String),

    #[error("missing required parameters: {}", .0.join(" "))]
    MissingParameters(Vec<&'static str>),

    #[error("evidence reader is {actual:?}, operation requires {expected}")]
    InvalidReaderState {
        actual: crate::evidence_reader::ReaderState,
        expected: &'static str,
    },

    #[error(
        "evidence on chromosome {0} found after that chromosome was completed, all sources must be sorted in the same chromosome order"
    )]
    ChromosomeOutOfOrder(String),
}

impl EvidenceError {
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type EvidenceResult<T> = Result<T, EvidenceError>;

/// Failure to apply one `key:value` reader parameter
///
/// Unknown keys are reported to the caller without affecting previously set parameters.
///
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("unknown parameter '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for parameter '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("parameter '{0}' is not in key:value format")]
    MissingValue(String),

    #[error("can't set parameter '{key}', reader is {state:?}")]
    ReaderNotConfigurable {
        key: String,
        state: crate::evidence_reader::ReaderState,
    },
}
