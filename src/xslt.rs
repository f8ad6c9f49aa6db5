//! XSLT post-processing through an external processor.
//!
//! The converter never transforms XML itself. Each record's MARCXML document
//! is handed to an [`XsltProcessor`] together with the stylesheet path, and
//! the processor's output replaces the record in the output stream.
//! [`SaxonProcessor`] runs Saxon as a subprocess; tests substitute their own
//! implementation.

use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// File name of the Saxon jar looked up beside the stylesheet.
pub const SAXON_JAR: &str = "saxon.jar";

/// Failure reported by an [`XsltProcessor`].
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// The processor could not be started.
    #[error("processor unavailable: {0}")]
    Unavailable(#[source] std::io::Error),

    /// The processor ran and exited unsuccessfully.
    #[error("processor exited with {}: {stderr}", exit_description(.status))]
    Failed {
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The processor's output was not UTF-8.
    #[error("processor output is not UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

#[allow(clippy::ref_option)]
fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// A stylesheet-driven transformation of one MARCXML document.
pub trait XsltProcessor: std::fmt::Debug {
    /// Transform `document` with the stylesheet at `stylesheet`, returning
    /// the processor's output.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessorError`] if the processor cannot run or fails.
    fn transform(&self, document: &str, stylesheet: &Path) -> Result<String, ProcessorError>;
}

/// Runs Saxon (`java -jar saxon.jar -s:<input> -xsl:<stylesheet>`) once per
/// document.
///
/// Saxon reads its source from a file, so each document is written to a
/// temporary file that is removed after the call.
#[derive(Debug, Clone)]
pub struct SaxonProcessor {
    java: PathBuf,
    jar: PathBuf,
}

impl SaxonProcessor {
    /// Processor using `java` from `PATH` and the given jar.
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        SaxonProcessor {
            java: PathBuf::from("java"),
            jar: jar.into(),
        }
    }

    /// Use a different Java launcher.
    #[must_use]
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    /// The jar this processor runs.
    #[must_use]
    pub fn jar(&self) -> &Path {
        &self.jar
    }
}

impl XsltProcessor for SaxonProcessor {
    fn transform(&self, document: &str, stylesheet: &Path) -> Result<String, ProcessorError> {
        let mut source = tempfile::Builder::new()
            .prefix("marc2xml-")
            .suffix(".xml")
            .tempfile()
            .map_err(ProcessorError::Unavailable)?;
        source
            .write_all(document.as_bytes())
            .and_then(|()| source.flush())
            .map_err(ProcessorError::Unavailable)?;

        debug!(
            "Running {} -jar {} on {}",
            self.java.display(),
            self.jar.display(),
            source.path().display()
        );
        let output = Command::new(&self.java)
            .arg("-jar")
            .arg(&self.jar)
            .arg(format!("-s:{}", source.path().display()))
            .arg(format!("-xsl:{}", stylesheet.display()))
            .output()
            .map_err(ProcessorError::Unavailable)?;

        if !output.status.success() {
            return Err(ProcessorError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
