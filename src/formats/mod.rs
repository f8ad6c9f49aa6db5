//! Reader/writer traits and the file formats this crate speaks.
//!
//! | Format | Reader/Writer | Extension |
//! |--------|---------------|-----------|
//! | MARC .lex | [`LexReader`](crate::reader::LexReader) | `.lex` |
//! | MARC XML | [`MarcXmlWriter`](crate::writer::MarcXmlWriter) | `.xml` |
//!
//! # Moving records
//!
//! ```
//! use marc2xml::formats::copy_records;
//! use marc2xml::{LexReader, MarcXmlWriter};
//! use std::io::Cursor;
//!
//! let mut reader = LexReader::new(Cursor::new("001 1\x1d\n001 2\x1d\n"));
//! let mut writer = MarcXmlWriter::new(Vec::new());
//! assert_eq!(copy_records(&mut reader, &mut writer)?, 2);
//! # Ok::<(), marc2xml::MarcError>(())
//! ```

mod traits;

pub use traits::{copy_records, FormatReader, FormatWriter};

/// File formats known to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Format {
    /// Line-oriented MARC exchange text (`.lex`)
    Lex,
    /// MARC XML (`.xml`)
    MarcXml,
    /// XSLT stylesheet (`.xsl`)
    Xslt,
}

impl Format {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    ///
    /// # Example
    ///
    /// ```
    /// use marc2xml::formats::Format;
    ///
    /// assert_eq!(Format::from_extension("lex"), Some(Format::Lex));
    /// assert_eq!(Format::from_extension("mrc"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "lex" => Some(Self::Lex),
            "xml" => Some(Self::MarcXml),
            "xsl" => Some(Self::Xslt),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Lex => "lex",
            Self::MarcXml => "xml",
            Self::Xslt => "xsl",
        }
    }

    /// Get the human-readable name for this format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lex => "MARC .lex",
            Self::MarcXml => "MARC XML",
            Self::Xslt => "XSLT",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("lex"), Some(Format::Lex));
        assert_eq!(Format::from_extension("LEX"), Some(Format::Lex));
        assert_eq!(Format::from_extension("xml"), Some(Format::MarcXml));
        assert_eq!(Format::from_extension("xsl"), Some(Format::Xslt));
        assert_eq!(Format::from_extension("mrc"), None);
    }

    #[test]
    fn test_format_extension_and_display() {
        assert_eq!(Format::Lex.extension(), "lex");
        assert_eq!(Format::MarcXml.extension(), "xml");
        assert_eq!(format!("{}", Format::MarcXml), "MARC XML");
    }
}
