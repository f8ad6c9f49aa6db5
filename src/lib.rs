#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc2xml
//!
//! Converts MARC records in the line-oriented `.lex` text format into MARC
//! XML, optionally passing each record through an XSLT stylesheet.
//!
//! ## Quick Start
//!
//! ### Reading `.lex` Records
//!
//! ```
//! use marc2xml::LexReader;
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "LDR 00000nam a2200000 a 4500\n001 12345\n245 10$aThe Great Gatsby$cF. Scott Fitzgerald\x1d\n";
//! let mut reader = LexReader::new(Cursor::new(data));
//!
//! while let Some(record) = reader.read_record()? {
//!     assert_eq!(record.get_control_field("001"), Some("12345"));
//!     let title = record.get_field("245").and_then(|f| f.get_subfield('a'));
//!     assert_eq!(title, Some("The Great Gatsby"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing MARC XML
//!
//! ```
//! use marc2xml::{record_to_marcxml, Field, Leader, Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::new(Leader::default());
//! record.add_control_field("001".to_string(), "12345".to_string());
//!
//! let mut field = Field::new("245".to_string(), '1', '0');
//! field.add_subfield('a', "Test Title".to_string());
//! record.add_field(field);
//!
//! let xml = record_to_marcxml(&record)?;
//! assert!(xml.contains(r#"<controlfield tag="001">12345</controlfield>"#));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Core MARC record structures (`Record`, `Field`, `Subfield`)
//! - [`leader`] — MARC record leader (24-character header)
//! - [`reader`] — Parsing MARC `.lex` text into records
//! - [`marcxml`] — MARCXML serialization and deserialization
//! - [`writer`] — Streaming MARCXML collection writer
//! - [`xslt`] — External XSLT processing (Saxon)
//! - [`convert`] — The end-to-end conversion pipeline
//! - [`config`] — Conversion settings and command-line parsing
//! - [`formats`] — Format identification and reader/writer traits
//! - [`error`] — Error types and result type

pub mod config;
pub mod convert;
pub mod error;
/// Format identification and unified Reader/Writer traits.
///
/// See the [`formats`] module documentation for details.
pub mod formats;
pub mod leader;
pub mod marcxml;
pub mod reader;
/// Core MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod writer;
pub mod xslt;

pub use config::{CliCommand, ConvertConfig, HELP_TEXT};
pub use convert::{run, ConvertSummary, Converter};
pub use error::{MarcError, Result};
pub use formats::{copy_records, Format, FormatReader, FormatWriter};
pub use leader::Leader;
pub use marcxml::{
    clean_text, marcxml_to_record, marcxml_to_records, record_to_document, record_to_marcxml,
    records_to_marcxml,
};
pub use reader::{LexOptions, LexReader};
pub use record::{ControlField, Field, FieldBuilder, Record, RecordBuilder, Subfield, VariableField};
pub use writer::MarcXmlWriter;
pub use xslt::{ProcessorError, SaxonProcessor, XsltProcessor};
