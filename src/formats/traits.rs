//! The reader and writer seams of the conversion pipeline.
//!
//! [`Converter`](crate::Converter) pulls records from a [`FormatReader`] and,
//! without a stylesheet, pushes them into a [`FormatWriter`].

use crate::error::Result;
use crate::record::Record;

/// A source of MARC records, consumed one record at a time.
pub trait FormatReader: std::fmt::Debug {
    /// Next record, or `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed or cannot be read.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Records returned so far.
    fn records_read(&self) -> usize;
}

/// A sink for MARC records.
///
/// Output may be incomplete until [`finish`](Self::finish) has been called.
pub trait FormatWriter: std::fmt::Debug {
    /// Write one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Complete the output and flush it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    fn finish(&mut self) -> Result<()>;

    /// Records written so far.
    fn records_written(&self) -> usize;
}

/// Move every record from `reader` to `writer`, then finish the writer.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns the first reader or writer error; records before it have been
/// written.
pub fn copy_records<R, W>(reader: &mut R, writer: &mut W) -> Result<usize>
where
    R: FormatReader + ?Sized,
    W: FormatWriter + ?Sized,
{
    while let Some(record) = reader.read_record()? {
        writer.write_record(&record)?;
    }
    writer.finish()?;
    Ok(writer.records_written())
}
