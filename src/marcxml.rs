//! MARCXML serialization and deserialization of MARC records.
//!
//! Output follows the Library of Congress MARC21 slim schema
//! (<https://www.loc.gov/standards/marcxml/>): `tag`, `ind1`, `ind2` and `code`
//! are attributes, control and data fields appear in record order, and the
//! `<collection>` root carries the MARC21 slim default namespace.
//!
//! Text is cleaned on the way out: entity references already present in the
//! source (`&amp;`, `&#233;`, ...) are decoded, the result is NFC-normalized,
//! and the serializer escapes it again. Source text that was already escaped
//! is therefore not escaped twice.
//!
//! # Examples
//!
//! ```
//! use marc2xml::{marcxml, Field, Leader, Record};
//!
//! let mut record = Record::new(Leader::default());
//! let mut field = Field::new("245".to_string(), '1', '0');
//! field.add_subfield_str('a', "Title");
//! record.add_field(field);
//!
//! let xml = marcxml::record_to_marcxml(&record)?;
//! assert!(xml.contains(r#"<datafield tag="245" ind1="1" ind2="0">"#));
//!
//! let restored = marcxml::marcxml_to_record(&xml)?;
//! assert_eq!(restored.get_field("245").and_then(|f| f.get_subfield('a')), Some("Title"));
//! # Ok::<(), marc2xml::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::leader::{Leader, LEADER_LENGTH};
use crate::record::{ControlField, Field, Record, VariableField};
use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use quick_xml::se::to_string as xml_to_string;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// XML declaration and opening `<collection>` tag of a MARCXML document.
pub const COLLECTION_START: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<collection xmlns=\"http://www.loc.gov/MARC21/slim\" ",
    "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ",
    "xsi:schemaLocation=\"http://www.loc.gov/MARC21/slim ",
    "http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd\">\n"
);

/// Closing `<collection>` tag of a MARCXML document.
pub const COLLECTION_END: &str = "</collection>\n";

/// MARCXML record representation for serialization.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "record")]
pub struct MarcxmlRecord {
    /// MARC leader string
    pub leader: String,
    /// Control and data fields in record order
    #[serde(rename = "$value", default)]
    pub fields: Vec<MarcxmlField>,
}

/// A `<controlfield>` or `<datafield>` element.
#[derive(Debug, Serialize, Deserialize)]
pub enum MarcxmlField {
    /// Control field: tag attribute and raw text
    #[serde(rename = "controlfield")]
    Control {
        /// Field tag as an XML attribute (e.g., "001", "008")
        #[serde(rename = "@tag")]
        tag: String,
        /// Control field value (text content)
        #[serde(rename = "$value", default)]
        value: String,
    },
    /// Data field: tag and indicator attributes, subfield children
    #[serde(rename = "datafield")]
    Data {
        /// Field tag as an XML attribute (e.g., "245", "650")
        #[serde(rename = "@tag")]
        tag: String,
        /// First indicator as an XML attribute
        #[serde(rename = "@ind1")]
        ind1: String,
        /// Second indicator as an XML attribute
        #[serde(rename = "@ind2")]
        ind2: String,
        /// Subfields
        #[serde(default)]
        subfield: Vec<MarcxmlSubfield>,
    },
}

/// MARCXML subfield representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlSubfield {
    /// Subfield code as an XML attribute (e.g., "a", "b", "c")
    #[serde(rename = "@code")]
    pub code: String,
    /// Subfield value (text content)
    #[serde(rename = "$value", default)]
    pub value: String,
}

/// MARCXML collection wrapper for multiple records.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "collection")]
pub struct MarcxmlCollection {
    /// Records in the collection
    #[serde(default, rename = "record")]
    pub records: Vec<MarcxmlRecord>,
}

// ---------------------------------------------------------------------------
// Text cleaning
// ---------------------------------------------------------------------------

lazy_static! {
    /// A numeric (`&#233;`, `&#xE9;`) or named (`&eacute;`) reference.
    static ref ENTITY_REFERENCE: Regex = Regex::new(r"&#?\w+;").expect("valid entity pattern");
}

/// Whether `c` is allowed in XML 1.0 character data.
#[must_use]
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Decode entity references, drop characters XML cannot carry, and
/// NFC-normalize `text`.
///
/// Each reference is decoded on its own: XML and HTML named references and
/// numeric references are resolved, anything unrecognized (`&foo;`, a bare
/// `&`) stays as written and is escaped by the serializer. C0 control
/// characters other than tab, line feed and carriage return are removed,
/// including ones produced by a numeric reference.
#[must_use]
pub fn clean_text(text: &str) -> Cow<'_, str> {
    let decoded = if text.contains('&') {
        ENTITY_REFERENCE.replace_all(text, |caps: &Captures| {
            let reference = &caps[0];
            quick_xml::escape::unescape(reference)
                .map_or_else(|_| reference.to_string(), Cow::into_owned)
        })
    } else {
        Cow::Borrowed(text)
    };

    let allowed = if decoded.chars().all(is_xml_char) {
        decoded
    } else {
        Cow::Owned(decoded.chars().filter(|&c| is_xml_char(c)).collect())
    };

    if unicode_normalization::is_nfc(&allowed) {
        allowed
    } else {
        Cow::Owned(allowed.nfc().collect())
    }
}

// ---------------------------------------------------------------------------
// Namespace stripping
// ---------------------------------------------------------------------------

/// Strip XML namespace prefixes and declarations from MARCXML input.
///
/// Handles both `marc:record` → `record` (prefixed namespace) and
/// `xmlns="..."` / `xmlns:marc="..."` (namespace declarations).
fn strip_marcxml_ns(xml: &str) -> Result<String> {
    let re_xmlns = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#)
        .map_err(|e| MarcError::Xml(e.to_string()))?;
    let stripped = re_xmlns.replace_all(xml, "");

    let re_prefix = Regex::new(r"<(/?)(\w+):").map_err(|e| MarcError::Xml(e.to_string()))?;
    Ok(re_prefix.replace_all(&stripped, "<$1").to_string())
}

// ---------------------------------------------------------------------------
// Serialization: Record → MARCXML
// ---------------------------------------------------------------------------

fn to_marcxml_record(record: &Record) -> MarcxmlRecord {
    let fields = record
        .fields
        .iter()
        .map(|field| match field {
            VariableField::Control(cf) => MarcxmlField::Control {
                tag: cf.tag.clone(),
                value: clean_text(&cf.value).into_owned(),
            },
            VariableField::Data(df) => MarcxmlField::Data {
                tag: df.tag.clone(),
                ind1: df.indicator1.to_string(),
                ind2: df.indicator2.to_string(),
                subfield: df
                    .subfields
                    .iter()
                    .map(|sf| MarcxmlSubfield {
                        code: sf.code.to_string(),
                        value: clean_text(&sf.value).into_owned(),
                    })
                    .collect(),
            },
        })
        .collect();

    MarcxmlRecord {
        leader: record.leader.to_string(),
        fields,
    }
}

/// Convert a MARC record to a `<record>` element.
///
/// The fragment has no XML declaration and no namespace declaration; it is
/// meant to sit inside a `<collection>` opened with [`COLLECTION_START`].
///
/// # Errors
///
/// Returns an error if the record cannot be serialized to XML.
pub fn record_to_marcxml(record: &Record) -> Result<String> {
    xml_to_string(&to_marcxml_record(record))
        .map_err(|e| MarcError::Xml(format!("Failed to serialize to MARCXML: {e}")))
}

/// Convert a MARC record to a complete MARCXML document holding only that
/// record.
///
/// This is the per-record input handed to an XSLT processor.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized to XML.
pub fn record_to_document(record: &Record) -> Result<String> {
    let body = record_to_marcxml(record)?;
    Ok(format!("{COLLECTION_START}{body}\n{COLLECTION_END}"))
}

/// Convert several records to one MARCXML `<collection>` document.
///
/// # Errors
///
/// Returns an error if any record cannot be serialized to XML.
pub fn records_to_marcxml(records: &[Record]) -> Result<String> {
    let mut xml = String::from(COLLECTION_START);
    for record in records {
        xml.push_str(&record_to_marcxml(record)?);
        xml.push('\n');
    }
    xml.push_str(COLLECTION_END);
    Ok(xml)
}

// ---------------------------------------------------------------------------
// Deserialization: MARCXML → Record
// ---------------------------------------------------------------------------

/// Convert a MARCXML `<record>` string to a MARC record.
///
/// Accepts default-namespace, prefixed-namespace and namespace-free input.
/// The XML reader trims surrounding whitespace from text content.
///
/// # Errors
///
/// Returns an error if the XML is invalid or missing required elements.
pub fn marcxml_to_record(xml: &str) -> Result<Record> {
    let cleaned = strip_marcxml_ns(xml)?;
    let xml_record: MarcxmlRecord = xml_from_str(&cleaned)
        .map_err(|e| MarcError::Xml(format!("Failed to parse MARCXML: {e}")))?;

    marcxml_record_to_record(xml_record)
}

/// Convert a MARCXML `<collection>` string to multiple MARC records.
///
/// # Errors
///
/// Returns an error if the XML is invalid or cannot be parsed.
pub fn marcxml_to_records(xml: &str) -> Result<Vec<Record>> {
    let cleaned = strip_marcxml_ns(xml)?;
    let collection: MarcxmlCollection = xml_from_str(&cleaned)
        .map_err(|e| MarcError::Xml(format!("Failed to parse MARCXML collection: {e}")))?;

    collection
        .records
        .into_iter()
        .map(marcxml_record_to_record)
        .collect()
}

/// Convert a deserialized `MarcxmlRecord` into a `Record`.
fn marcxml_record_to_record(xml_record: MarcxmlRecord) -> Result<Record> {
    // Leading blanks (an unset record length) are trimmed by the XML reader
    let leader = if xml_record.leader.chars().count() < LEADER_LENGTH {
        Leader::parse(&format!("{:>width$}", xml_record.leader, width = LEADER_LENGTH))?
    } else {
        Leader::parse(&xml_record.leader)?
    };
    let mut record = Record::new(leader);

    for xml_field in xml_record.fields {
        match xml_field {
            MarcxmlField::Control { tag, value } => {
                record.push(VariableField::Control(ControlField { tag, value }));
            },
            MarcxmlField::Data {
                tag,
                ind1,
                ind2,
                subfield,
            } => {
                let ind1 = ind1.chars().next().unwrap_or(' ');
                let ind2 = ind2.chars().next().unwrap_or(' ');
                let mut field = Field::new(tag, ind1, ind2);

                for sf in subfield {
                    let code = sf.code.chars().next().ok_or_else(|| {
                        MarcError::Xml("Missing subfield code".to_string())
                    })?;
                    field.add_subfield(code, sf.value);
                }

                record.add_field(field);
            },
        }
    }

    Ok(record)
}
