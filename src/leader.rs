//! MARC record leader.
//!
//! The leader is a 24-character fixed-length header at the start of every
//! MARC record. In .lex sources it is carried verbatim on an `LDR` line and
//! written unchanged into the `<leader>` element of MARC XML.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, c = music, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Position 8: Control record type
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Entry map (usually "4500")

use crate::error::{MarcError, Result};
use crate::marcxml::is_xml_char;
use std::fmt;

/// Number of characters in a leader.
pub const LEADER_LENGTH: usize = 24;

/// MARC Leader - 24 characters at the start of every MARC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    value: String,
}

impl Leader {
    /// Parse a leader from its textual form.
    ///
    /// The value is kept exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidLeader`] if the value is not exactly
    /// 24 characters long or holds a character XML cannot carry.
    pub fn parse(value: &str) -> Result<Self> {
        let len = value.chars().count();
        if len != LEADER_LENGTH {
            return Err(MarcError::InvalidLeader(format!(
                "expected {LEADER_LENGTH} characters, found {len}"
            )));
        }
        if let Some(c) = value.chars().find(|&c| !is_xml_char(c)) {
            return Err(MarcError::InvalidLeader(format!(
                "character U+{:04X} is not allowed in XML",
                u32::from(c)
            )));
        }
        Ok(Leader {
            value: value.to_string(),
        })
    }

    /// The leader text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Character at a leader position, if present.
    #[must_use]
    pub fn char_at(&self, position: usize) -> Option<char> {
        self.value.chars().nth(position)
    }

    /// Record status (position 5).
    #[must_use]
    pub fn record_status(&self) -> char {
        self.char_at(5).unwrap_or(' ')
    }

    /// Type of record (position 6).
    #[must_use]
    pub fn record_type(&self) -> char {
        self.char_at(6).unwrap_or(' ')
    }

    /// Bibliographic level (position 7).
    #[must_use]
    pub fn bibliographic_level(&self) -> char {
        self.char_at(7).unwrap_or(' ')
    }

    /// Whether the character coding scheme (position 9) declares UCS/Unicode.
    #[must_use]
    pub fn is_unicode(&self) -> bool {
        self.char_at(9) == Some('a')
    }

    /// Return a copy with the structural positions set to their MARC 21
    /// values: indicator and subfield code counts (10-11) become `22` and the
    /// entry map (20-23) becomes `4500`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let chars: Vec<char> = self.value.chars().collect();
        let mut value = String::with_capacity(LEADER_LENGTH);
        value.extend(&chars[0..10]);
        value.push_str("22");
        value.extend(&chars[12..20]);
        value.push_str("4500");
        Leader { value }
    }
}

impl Default for Leader {
    /// A blank leader with the structural positions filled in:
    /// `"          22        4500"`.
    fn default() -> Self {
        Leader {
            value: " ".repeat(LEADER_LENGTH),
        }
        .normalized()
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
