//! Writing MARC records as a MARCXML collection.
//!
//! [`MarcXmlWriter`] streams records into one well-formed document: the XML
//! declaration and `<collection>` start tag go out before the first record,
//! the end tag on [`finish`](MarcXmlWriter::finish).
//!
//! # Examples
//!
//! ```
//! use marc2xml::{Field, Leader, MarcXmlWriter, Record};
//!
//! let mut record = Record::new(Leader::default());
//! let mut field = Field::new("245".to_string(), '1', '0');
//! field.add_subfield_str('a', "Title");
//! record.add_field(field);
//!
//! let mut writer = MarcXmlWriter::new(Vec::new());
//! writer.write_record(&record)?;
//! let bytes = writer.into_inner()?;
//!
//! let xml = String::from_utf8(bytes).unwrap();
//! assert!(xml.trim_end().ends_with("</collection>"));
//! # Ok::<(), marc2xml::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::formats::FormatWriter;
use crate::marcxml::{record_to_marcxml, COLLECTION_END, COLLECTION_START};
use crate::record::Record;
use std::io::Write;

/// Writer for MARCXML collections.
#[derive(Debug)]
pub struct MarcXmlWriter<W: Write> {
    writer: W,
    records_written: usize,
    started: bool,
    finished: bool,
}

impl<W: Write> MarcXmlWriter<W> {
    /// Create a new MARCXML writer.
    pub fn new(writer: W) -> Self {
        MarcXmlWriter {
            writer,
            records_written: 0,
            started: false,
            finished: false,
        }
    }

    fn start(&mut self) -> Result<()> {
        if !self.started {
            self.writer.write_all(COLLECTION_START.as_bytes())?;
            self.started = true;
        }
        Ok(())
    }

    /// Write a single record as a `<record>` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished, the record cannot be
    /// serialized, or writing fails.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::Xml(
                "Cannot write to a finished writer".to_string(),
            ));
        }
        self.start()?;

        let xml = record_to_marcxml(record)?;
        self.writer.write_all(xml.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    /// Close the collection and flush.
    ///
    /// An empty collection is still a complete document. Calling `finish`
    /// more than once has no further effect.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.start()?;
        self.writer.write_all(COLLECTION_END.as_bytes())?;
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Finish the document and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if finishing fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?;
        Ok(self.writer)
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for MarcXmlWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        MarcXmlWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        MarcXmlWriter::finish(self)
    }

    fn records_written(&self) -> usize {
        self.records_written
    }
}
