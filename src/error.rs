//! Error types for MARC conversion.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type. Every variant is fatal to a
//! conversion run: the pipeline never skips a bad record and never retries.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for all MARC conversion operations.
#[derive(Error, Debug)]
pub enum MarcError {
    /// A malformed line in a MARC .lex source.
    #[error("Parse error at line {line}: {message}: {content:?}")]
    Parse {
        /// 1-based line number of the offending line.
        line: usize,
        /// Raw content of the offending line, without the line ending.
        content: String,
        /// What is wrong with the line.
        message: String,
    },

    /// Input ended while a record was still open.
    #[error("Incomplete record {record}: input ended at line {line} without a record terminator")]
    IncompleteRecord {
        /// 1-based index of the unterminated record.
        record: usize,
        /// Last line number read.
        line: usize,
    },

    /// The XSLT processor could not be run or reported a failure.
    #[error("XSLT processing failed for record {record}: {output}")]
    XsltProcessing {
        /// 1-based index of the record being transformed.
        record: usize,
        /// Processor diagnostics.
        output: String,
    },

    /// An input, output or stylesheet path was rejected.
    #[error("Invalid {role} path {}: {message}", path.display())]
    Path {
        /// Which file the path names ("input", "output", "xslt", "xslt processor").
        role: &'static str,
        /// The rejected path.
        path: PathBuf,
        /// Why the path was rejected.
        message: String,
    },

    /// Error indicating an invalid leader (24-character header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error while producing or reading MARC XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Error in command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarcError {
    /// Build a [`MarcError::Parse`] for the given line.
    pub(crate) fn parse(line: usize, content: &str, message: impl Into<String>) -> Self {
        MarcError::Parse {
            line,
            content: content.to_string(),
            message: message.into(),
        }
    }

    /// Build a [`MarcError::Path`].
    pub(crate) fn path(
        role: &'static str,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        MarcError::Path {
            role,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_line_and_content() {
        let err = MarcError::parse(7, "24 10$aTitle", "invalid tag");
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("24 10$aTitle"));
        assert!(msg.contains("invalid tag"));
    }

    #[test]
    fn test_path_error_display() {
        let err = MarcError::path("input", "records.mrc", "expected extension .lex");
        assert_eq!(
            err.to_string(),
            "Invalid input path records.mrc: expected extension .lex"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MarcError = io.into();
        assert!(matches!(err, MarcError::Io(_)));
    }
}
