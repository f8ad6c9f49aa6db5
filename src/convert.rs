//! The conversion pipeline: `.lex` in, MARC XML out.
//!
//! Records are read, serialized, optionally transformed, and written one at
//! a time. Without a stylesheet the output is a single `<collection>`
//! document. With one, every record goes to the [`XsltProcessor`] as its own
//! MARCXML document and the processor's output is appended verbatim, so the
//! result as a whole is only well-formed if the stylesheet makes it so.
//!
//! # Examples
//!
//! ```
//! use marc2xml::{Converter, LexReader};
//! use std::io::Cursor;
//!
//! let input = "001 1\x1d\n001 2\x1d\n";
//! let mut output = Vec::new();
//!
//! let summary = Converter::new().run(LexReader::new(Cursor::new(input)), &mut output)?;
//! assert_eq!(summary.records, 2);
//! # Ok::<(), marc2xml::MarcError>(())
//! ```

use crate::config::ConvertConfig;
use crate::error::{MarcError, Result};
use crate::formats::{copy_records, FormatReader};
use crate::marcxml::record_to_document;
use crate::reader::LexReader;
use crate::record::Record;
use crate::writer::MarcXmlWriter;
use crate::xslt::{SaxonProcessor, XsltProcessor};
use log::{debug, info};
use std::fs::File;
use std::fmt::Debug;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Records converted.
    pub records: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Drives a conversion, with or without XSLT.
#[derive(Debug, Default)]
pub struct Converter {
    xslt: Option<(Box<dyn XsltProcessor>, PathBuf)>,
}

impl Converter {
    /// Converter writing one MARCXML collection.
    #[must_use]
    pub fn new() -> Self {
        Converter { xslt: None }
    }

    /// Transform every record with `stylesheet` through `processor`.
    #[must_use]
    pub fn with_xslt(
        mut self,
        processor: Box<dyn XsltProcessor>,
        stylesheet: impl Into<PathBuf>,
    ) -> Self {
        self.xslt = Some((processor, stylesheet.into()));
        self
    }

    /// Convert every record from `reader` into `output`.
    ///
    /// Stops at the first error; output already written stays written.
    ///
    /// # Errors
    ///
    /// Returns the reader's parse errors, [`MarcError::XsltProcessing`] when
    /// the processor fails on a record, and I/O errors from `output`.
    pub fn run<R, W>(&self, mut reader: R, output: W) -> Result<ConvertSummary>
    where
        R: FormatReader,
        W: Write + Debug,
    {
        let start = Instant::now();
        let records = match &self.xslt {
            None => {
                let mut writer = MarcXmlWriter::new(output);
                copy_records(&mut LoggingReader(&mut reader), &mut writer)?
            },
            Some((processor, stylesheet)) => {
                write_transformed(&mut reader, output, processor.as_ref(), stylesheet)?
            },
        };

        let summary = ConvertSummary {
            records,
            elapsed: start.elapsed(),
        };
        info!(
            "{} records converted in {:.2} seconds",
            summary.records,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }
}

/// Logs each record as it passes through.
#[derive(Debug)]
struct LoggingReader<'a, R: FormatReader>(&'a mut R);

impl<R: FormatReader> FormatReader for LoggingReader<'_, R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        let record = self.0.read_record()?;
        if let Some(record) = &record {
            log_record(self.0.records_read(), record);
        }
        Ok(record)
    }

    fn records_read(&self) -> usize {
        self.0.records_read()
    }
}

fn log_record(index: usize, record: &Record) {
    let leader = &record.leader;
    debug!(
        "Record {index}: {} fields, status {:?}, type {:?}, {}",
        record.len(),
        leader.record_status(),
        leader.record_type(),
        if leader.is_unicode() { "UCS/Unicode" } else { "MARC-8" }
    );
}

fn write_transformed<R: FormatReader, W: Write>(
    reader: &mut R,
    mut output: W,
    processor: &dyn XsltProcessor,
    stylesheet: &Path,
) -> Result<usize> {
    while let Some(record) = reader.read_record()? {
        let index = reader.records_read();
        log_record(index, &record);

        let document = record_to_document(&record)?;
        let transformed = processor
            .transform(&document, stylesheet)
            .map_err(|e| MarcError::XsltProcessing {
                record: index,
                output: e.to_string(),
            })?;
        output.write_all(transformed.as_bytes())?;
    }
    output.flush()?;
    Ok(reader.records_read())
}

/// Run the conversion described by `config`: validate paths, open the
/// files, and convert.
///
/// # Errors
///
/// Returns [`MarcError::Path`] for rejected or unwritable paths and any
/// error from [`Converter::run`].
pub fn run(config: &ConvertConfig) -> Result<ConvertSummary> {
    config.validate()?;

    info!("Input file: {}", config.input.display());
    info!("Output file: {}", config.output.display());

    let input = File::open(&config.input)
        .map_err(|e| MarcError::path("input", &config.input, e.to_string()))?;
    let output = File::create(&config.output)
        .map_err(|e| MarcError::path("output", &config.output, e.to_string()))?;

    let mut converter = Converter::new();
    if let (Some(stylesheet), Some(jar)) = (&config.stylesheet, config.saxon_jar_path()) {
        info!("XSLT: {} (processor {})", stylesheet.display(), jar.display());
        converter = converter.with_xslt(Box::new(SaxonProcessor::new(jar)), stylesheet);
    }

    let reader = LexReader::new(BufReader::new(input)).with_options(config.lex.clone());
    converter.run(reader, BufWriter::new(output))
}
