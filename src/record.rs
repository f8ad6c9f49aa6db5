//! MARC record structures.
//!
//! This module provides the record types produced by the .lex reader and
//! consumed by the MARC XML serializer:
//! - [`Record`] — leader plus an ordered list of fields
//! - [`VariableField`] — either a [`ControlField`] or a data [`Field`]
//! - [`Subfield`] — coded data element within a data field
//!
//! Control and data fields share one list so that the order of the source
//! survives into the XML output.
//!
//! # Examples
//!
//! ```
//! use marc2xml::{Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field_str("001", "12345")
//!     .field(
//!         Field::builder("245".to_string(), '1', '0')
//!             .subfield_str('a', "Title")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.get_control_field("001"), Some("12345"));
//! assert_eq!(record.get_field("245").and_then(|f| f.get_subfield('a')), Some("Title"));
//! ```

use crate::leader::Leader;
use smallvec::SmallVec;

/// Number of characters in a field tag.
pub const TAG_LENGTH: usize = 3;

/// Aleph system tags that carry raw content like `00X` control fields.
pub const ALEPH_CONTROL_TAGS: [&str; 2] = ["DB ", "SYS"];

/// Whether `tag` names a control field: an all-digit tag below `010`, or an
/// Aleph system tag.
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    if ALEPH_CONTROL_TAGS.contains(&tag) {
        return true;
    }
    tag.len() == TAG_LENGTH && tag.bytes().all(|b| b.is_ascii_digit()) && tag < "010"
}

/// Whether `tag` is a well-formed tag: three ASCII alphanumerics, or an
/// Aleph system tag.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    ALEPH_CONTROL_TAGS.contains(&tag)
        || (tag.len() == TAG_LENGTH && tag.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// A MARC bibliographic record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Record leader (24 characters)
    pub leader: Leader,
    /// Control and data fields in source order
    pub fields: Vec<VariableField>,
}

/// One field of a record, in either of its two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableField {
    /// Field with raw content and no indicators
    Control(ControlField),
    /// Field with indicators and subfields
    Data(Field),
}

/// A control field (tags 001-009 and the Aleph system tags)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlField {
    /// Field tag (3 characters)
    pub tag: String,
    /// Raw field content
    pub value: String,
}

/// A data field in a MARC record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field tag (3 characters)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new MARC record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing MARC records
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Append a field of either kind
    pub fn push(&mut self, field: VariableField) {
        self.fields.push(field);
    }

    /// Append a control field
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.push(VariableField::Control(ControlField { tag, value }));
    }

    /// Append a control field using string slices
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Append a data field
    pub fn add_field(&mut self, field: Field) {
        self.push(VariableField::Data(field));
    }

    /// Get the first control field value with a given tag
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields()
            .find(|cf| cf.tag == tag)
            .map(|cf| cf.value.as_str())
    }

    /// Iterate over control fields in source order
    pub fn control_fields(&self) -> impl Iterator<Item = &ControlField> {
        self.fields.iter().filter_map(VariableField::as_control)
    }

    /// Iterate over data fields in source order
    pub fn data_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter_map(VariableField::as_data)
    }

    /// Get all data fields with a given tag
    #[must_use]
    pub fn get_fields(&self, tag: &str) -> Vec<&Field> {
        self.data_fields().filter(|f| f.tag == tag).collect()
    }

    /// Get first data field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.data_fields().find(|f| f.tag == tag)
    }

    /// Number of fields of both kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl VariableField {
    /// The field tag
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            VariableField::Control(cf) => &cf.tag,
            VariableField::Data(f) => &f.tag,
        }
    }

    /// The control field, if this is one
    #[must_use]
    pub fn as_control(&self) -> Option<&ControlField> {
        match self {
            VariableField::Control(cf) => Some(cf),
            VariableField::Data(_) => None,
        }
    }

    /// The data field, if this is one
    #[must_use]
    pub fn as_data(&self) -> Option<&Field> {
        match self {
            VariableField::Data(f) => Some(f),
            VariableField::Control(_) => None,
        }
    }
}

/// Builder for fluently constructing MARC records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field to the record being built
    #[must_use]
    pub fn control_field(mut self, tag: String, value: String) -> Self {
        self.record.add_control_field(tag, value);
        self
    }

    /// Add a control field using string slices
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field to the record being built
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marc2xml::Field;
    ///
    /// let field = Field::builder("245".to_string(), '1', '0')
    ///     .subfield('a', "The Great Gatsby".to_string())
    ///     .subfield('c', "F. Scott Fitzgerald".to_string())
    ///     .build();
    /// assert_eq!(field.subfields.len(), 2);
    /// ```
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Add a subfield using a string slice
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// Get all values for a subfield code
    #[must_use]
    pub fn get_subfield_values(&self, code: char) -> Vec<&str> {
        self.subfields
            .iter()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
            .collect()
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Iterate over all subfields
    pub fn subfields(&self) -> impl Iterator<Item = &Subfield> {
        self.subfields.iter()
    }
}

/// Builder for fluently constructing data fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield to the field being built
    #[must_use]
    pub fn subfield(mut self, code: char, value: String) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Add a subfield using a string slice
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}
