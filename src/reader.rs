//! Reading MARC records from line-oriented `.lex` sources.
//!
//! Each line of a `.lex` file carries one field: a three-character tag, a
//! single space, then the field content. The content of a data field starts
//! with its two indicators followed by subfields, each introduced by a
//! subfield delimiter and a one-character code. A line may end with the
//! end-of-field character (`0x1E`); the record terminator (`0x1D`), either at
//! the end of the last field line or on a line of its own, closes the record.
//! The leader travels on an `LDR` line.
//!
//! ```text
//! LDR 00714cam a2200205 a 4500
//! 001 12883376
//! 245 10$aTitle$bSubtitle␞␝
//! ```
//!
//! # Examples
//!
//! ```
//! use marc2xml::LexReader;
//! use std::io::Cursor;
//!
//! let data = "245 10$aTitle$bSubtitle\x1e\x1d\n";
//! let mut reader = LexReader::new(Cursor::new(data));
//!
//! let record = reader.read_record()?.expect("one record");
//! let field = record.get_field("245").expect("title field");
//! assert_eq!(field.indicator1, '1');
//! assert_eq!(field.get_subfield('b'), Some("Subtitle"));
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), marc2xml::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::formats::FormatReader;
use crate::leader::Leader;
use crate::marcxml::is_xml_char;
use crate::record::{is_control_tag, is_valid_tag, ControlField, Field, Record, VariableField};
use log::debug;
use std::io::BufRead;

/// End of field marker.
pub const FIELD_TERMINATOR: char = '\u{1E}';
/// Record boundary marker.
pub const RECORD_TERMINATOR: char = '\u{1D}';
/// Subfield delimiter control character.
pub const SUBFIELD_DELIMITER: char = '\u{1F}';
/// Printable subfield delimiter accepted alongside [`SUBFIELD_DELIMITER`].
pub const DOLLAR_DELIMITER: char = '$';

const TAG_SEPARATOR: char = ' ';
const LEADER_TAG: &str = "LDR";

/// Parser settings for `.lex` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexOptions {
    /// Characters that introduce a subfield.
    ///
    /// Defaults to both `0x1F` and `$`.
    pub subfield_delimiters: Vec<char>,
}

impl Default for LexOptions {
    fn default() -> Self {
        LexOptions {
            subfield_delimiters: vec![SUBFIELD_DELIMITER, DOLLAR_DELIMITER],
        }
    }
}

impl LexOptions {
    /// Options recognising a single subfield delimiter.
    #[must_use]
    pub fn with_delimiter(delimiter: char) -> Self {
        LexOptions {
            subfield_delimiters: vec![delimiter],
        }
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.subfield_delimiters.contains(&c)
    }
}

/// Reader for `.lex` MARC records.
///
/// Records are produced lazily, one per [`read_record`](Self::read_record)
/// call or iterator step. The reader is single-pass: once it has reported an
/// error or the end of input it yields nothing more.
#[derive(Debug)]
pub struct LexReader<R: BufRead> {
    reader: R,
    options: LexOptions,
    buffer: Vec<u8>,
    line_number: usize,
    records_read: usize,
    done: bool,
}

/// Fields collected for the record currently being read.
#[derive(Debug, Default)]
struct PendingRecord {
    leader: Option<Leader>,
    fields: Vec<VariableField>,
    lines: usize,
}

impl PendingRecord {
    fn is_empty(&self) -> bool {
        self.lines == 0
    }

    fn finish(self) -> Record {
        Record {
            leader: self.leader.unwrap_or_default(),
            fields: self.fields,
        }
    }
}

/// One parsed `.lex` line.
enum LexLine {
    Leader(Leader),
    Field(VariableField),
}

impl<R: BufRead> LexReader<R> {
    /// Create a new reader with default [`LexOptions`].
    pub fn new(reader: R) -> Self {
        LexReader {
            reader,
            options: LexOptions::default(),
            buffer: Vec::new(),
            line_number: 0,
            records_read: 0,
            done: false,
        }
    }

    /// Replace the parser options.
    #[must_use]
    pub fn with_options(mut self, options: LexOptions) -> Self {
        self.options = options;
        self
    }

    /// Number of input lines consumed so far.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record.
    ///
    /// Returns `Ok(Some(record))` when a record terminator has been reached,
    /// `Ok(None)` at the end of input.
    ///
    /// # Errors
    ///
    /// - [`MarcError::Parse`] for a malformed line
    /// - [`MarcError::IncompleteRecord`] when input ends inside a record
    /// - [`MarcError::Io`] if reading fails
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        let result = self.next_record();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut pending = PendingRecord::default();

        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                if pending.is_empty() {
                    return Ok(None);
                }
                return Err(MarcError::IncompleteRecord {
                    record: self.records_read + 1,
                    line: self.line_number,
                });
            }
            self.line_number += 1;
            let line_number = self.line_number;

            let raw = std::str::from_utf8(&self.buffer).map_err(|e| {
                MarcError::parse(
                    line_number,
                    &String::from_utf8_lossy(&self.buffer),
                    format!("invalid UTF-8: {e}"),
                )
            })?;
            let line = raw.trim_end_matches(['\n', '\r']);

            let (body, terminated) = split_record_terminator(line, line_number)?;
            let body = body.strip_suffix(FIELD_TERMINATOR).unwrap_or(body);

            if !body.trim().is_empty() {
                match parse_line(body, line_number, &self.options)? {
                    LexLine::Leader(leader) => {
                        if pending.leader.is_some() {
                            return Err(MarcError::parse(line_number, line, "duplicate leader"));
                        }
                        pending.leader = Some(leader);
                    },
                    LexLine::Field(field) => pending.fields.push(field),
                }
                pending.lines += 1;
            }

            if terminated {
                self.records_read += 1;
                debug!(
                    "Record {} complete at line {} ({} fields)",
                    self.records_read,
                    line_number,
                    pending.fields.len()
                );
                return Ok(Some(pending.finish()));
            }
        }
    }
}

impl<R: BufRead + std::fmt::Debug> FormatReader for LexReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        LexReader::read_record(self)
    }

    fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: BufRead> Iterator for LexReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Strip a trailing record terminator, rejecting one anywhere else.
fn split_record_terminator(line: &str, line_number: usize) -> Result<(&str, bool)> {
    match line.find(RECORD_TERMINATOR) {
        None => Ok((line, false)),
        Some(pos) if pos + RECORD_TERMINATOR.len_utf8() == line.len() => Ok((&line[..pos], true)),
        Some(_) => Err(MarcError::parse(
            line_number,
            line,
            "data after record terminator",
        )),
    }
}

fn parse_line(line: &str, line_number: usize, options: &LexOptions) -> Result<LexLine> {
    let tag_end = line
        .char_indices()
        .nth(3)
        .map_or(line.len(), |(idx, _)| idx);
    let tag = &line[..tag_end];
    let rest = &line[tag_end..];

    if tag.chars().count() != 3 {
        return Err(MarcError::parse(
            line_number,
            line,
            "tag must be exactly 3 characters",
        ));
    }
    if tag != LEADER_TAG && !is_valid_tag(tag) {
        return Err(MarcError::parse(
            line_number,
            line,
            format!("invalid tag {tag:?}"),
        ));
    }
    let Some(content) = rest.strip_prefix(TAG_SEPARATOR) else {
        return Err(MarcError::parse(
            line_number,
            line,
            "missing separator after tag",
        ));
    };

    if tag == LEADER_TAG {
        let leader = Leader::parse(content)
            .map_err(|e| MarcError::parse(line_number, line, e.to_string()))?;
        return Ok(LexLine::Leader(leader));
    }

    if is_control_tag(tag) {
        return Ok(LexLine::Field(VariableField::Control(ControlField {
            tag: tag.to_string(),
            value: content.to_string(),
        })));
    }

    parse_data_field(tag, content, line_number, options)
        .map_err(|message| MarcError::parse(line_number, line, message))
        .map(|field| LexLine::Field(VariableField::Data(field)))
}

/// Indicators and subfield codes become XML attributes and cannot be
/// silently dropped like text, so characters XML forbids are rejected.
fn check_attribute_char(what: &str, c: char) -> std::result::Result<char, String> {
    if is_xml_char(c) {
        Ok(c)
    } else {
        Err(format!("{what} U+{:04X} is not allowed in XML", u32::from(c)))
    }
}

fn parse_data_field(
    tag: &str,
    content: &str,
    line_number: usize,
    options: &LexOptions,
) -> std::result::Result<Field, String> {
    let mut chars = content.chars();
    // Missing indicators are recorded as blanks
    let indicator1 = check_attribute_char("indicator", chars.next().unwrap_or(' '))?;
    let indicator2 = check_attribute_char("indicator", chars.next().unwrap_or(' '))?;
    let mut field = Field::new(tag.to_string(), indicator1, indicator2);

    let mut fragments = chars.as_str().split(|c| options.is_delimiter(c));
    if let Some(leading) = fragments.next() {
        if !leading.is_empty() {
            debug!("Line {line_number}: ignoring {leading:?} before first subfield of {tag}");
        }
    }

    for fragment in fragments {
        let mut fragment_chars = fragment.chars();
        if let Some(code) = fragment_chars.next() {
            let code = check_attribute_char("subfield code", code)?;
            field.add_subfield_str(code, fragment_chars.as_str());
        }
    }

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &str) -> LexReader<Cursor<Vec<u8>>> {
        LexReader::new(Cursor::new(data.as_bytes().to_vec()))
    }

    fn read_all(data: &str) -> Result<Vec<Record>> {
        reader(data).collect()
    }

    #[test]
    fn test_single_data_field_record() {
        let records = read_all("245 10$aTitle$bSubtitle\x1e\x1d").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 1);

        let field = records[0].get_field("245").unwrap();
        assert_eq!(field.indicator1, '1');
        assert_eq!(field.indicator2, '0');
        let subfields: Vec<(char, &str)> = field
            .subfields()
            .map(|sf| (sf.code, sf.value.as_str()))
            .collect();
        assert_eq!(subfields, vec![('a', "Title"), ('b', "Subtitle")]);
    }

    #[test]
    fn test_full_record_with_leader_and_control_fields() {
        let data = "LDR 00714cam a2200205 a 4500\n\
                    001 12883376\x1e\n\
                    008 020805s2002    nyu           000 1 eng  \x1e\n\
                    100 1 \x1faSmith, John.\x1e\n\
                    245 10\x1faA book /\x1fcJohn Smith.\x1e\x1d\n";
        let records = read_all(data).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.leader.as_str(), "00714cam a2200205 a 4500");
        assert_eq!(record.get_control_field("001"), Some("12883376"));
        assert_eq!(
            record.get_control_field("008"),
            Some("020805s2002    nyu           000 1 eng  ")
        );
        assert_eq!(record.get_field("100").unwrap().indicator2, ' ');
        assert_eq!(
            record.get_field("245").unwrap().get_subfield('c'),
            Some("John Smith.")
        );
    }

    #[test]
    fn test_missing_leader_uses_default() {
        let records = read_all("001 1\x1d\n").unwrap();
        assert_eq!(records[0].leader, Leader::default());
    }

    #[test]
    fn test_boundary_on_its_own_line() {
        let data = "001 a\n245 00$aOne\n\x1d\n001 b\n245 00$aTwo\n\x1d\n";
        let records = read_all(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_control_field("001"), Some("b"));
    }

    #[test]
    fn test_record_count_matches_boundaries() {
        let data = "\x1d\n001 a\x1d\n\n\n001 b\x1d\r\n\x1d\n";
        let records = read_all(data).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records[0].is_empty());
        assert!(records[3].is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let records = read_all("001 x\r\n245 10$aT\x1e\x1d\r\n").unwrap();
        assert_eq!(records[0].get_control_field("001"), Some("x"));
        assert_eq!(records[0].get_field("245").unwrap().get_subfield('a'), Some("T"));
    }

    #[test]
    fn test_data_field_without_delimiter_has_no_subfields() {
        let records = read_all("500   Just some text\x1d").unwrap();
        let field = records[0].get_field("500").unwrap();
        assert_eq!(field.indicator1, ' ');
        assert!(field.subfields.is_empty());
    }

    #[test]
    fn test_missing_indicators_become_blank() {
        let records = read_all("650 \x1d\n").unwrap();
        let field = records[0].get_field("650").unwrap();
        assert_eq!((field.indicator1, field.indicator2), (' ', ' '));
        assert!(field.subfields.is_empty());

        let records = read_all("650 1\x1d\n").unwrap();
        let field = records[0].get_field("650").unwrap();
        assert_eq!((field.indicator1, field.indicator2), ('1', ' '));
    }

    #[test]
    fn test_empty_fragments_dropped_and_empty_values_kept() {
        let records = read_all("245 10$$aTitle$$b$\x1d").unwrap();
        let field = records[0].get_field("245").unwrap();
        let subfields: Vec<(char, &str)> = field
            .subfields()
            .map(|sf| (sf.code, sf.value.as_str()))
            .collect();
        assert_eq!(subfields, vec![('a', "Title"), ('b', "")]);
    }

    #[test]
    fn test_text_before_first_subfield_is_ignored() {
        let records = read_all("245 10junk$aTitle\x1d").unwrap();
        let field = records[0].get_field("245").unwrap();
        assert_eq!(field.subfields.len(), 1);
        assert_eq!(field.get_subfield('a'), Some("Title"));
    }

    #[test]
    fn test_single_delimiter_option_keeps_dollar_in_values() {
        let data = "020   \x1fa0262031418\x1fcUS$45.00\x1d";
        let records: Vec<Record> = reader(data)
            .with_options(LexOptions::with_delimiter(SUBFIELD_DELIMITER))
            .collect::<Result<_>>()
            .unwrap();
        let field = records[0].get_field("020").unwrap();
        assert_eq!(field.get_subfield('c'), Some("US$45.00"));
    }

    #[test]
    fn test_aleph_system_fields_are_control_fields() {
        let records = read_all("DB  BLL01\nSYS 012345678\x1d").unwrap();
        assert_eq!(records[0].get_control_field("DB "), Some("BLL01"));
        assert_eq!(records[0].get_control_field("SYS"), Some("012345678"));
        assert_eq!(records[0].data_fields().count(), 0);
    }

    #[test]
    fn test_utf8_content() {
        let records = read_all("245 00$aLes Misérables$cVictor Hugo\x1d").unwrap();
        assert_eq!(
            records[0].get_field("245").unwrap().get_subfield('a'),
            Some("Les Misérables")
        );
    }

    #[test]
    fn test_two_character_tag_is_parse_error() {
        let err = read_all("001 x\n24 10$aTitle\x1d").unwrap_err();
        match err {
            MarcError::Parse { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "24 10$aTitle");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_control_character_indicator_or_code_is_parse_error() {
        let err = read_all("001 x\n245 1\x1e$aTitle\x1d").unwrap_err();
        match err {
            MarcError::Parse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("U+001E"));
            },
            other => panic!("unexpected error: {other}"),
        }

        let options = LexOptions::with_delimiter('$');
        let err = reader("245 10$\x01Title\x1d")
            .with_options(options)
            .read_record()
            .unwrap_err();
        assert!(matches!(err, MarcError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_control_characters_inside_values_are_kept_for_cleaning() {
        let records = read_all("245 10$aA\x1e$bB\x1d").unwrap();
        let field = records[0].get_field("245").unwrap();
        assert_eq!(field.get_subfield('a'), Some("A\x1e"));
        assert_eq!(field.get_subfield('b'), Some("B"));
    }

    #[test]
    fn test_short_line_is_parse_error() {
        let err = read_all("24\n").unwrap_err();
        assert!(matches!(err, MarcError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_separator_is_parse_error() {
        let err = read_all("24510$aTitle\x1d").unwrap_err();
        match err {
            MarcError::Parse { message, .. } => assert!(message.contains("separator")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_leader_is_parse_error() {
        let err = read_all("LDR 00714cam\n\x1d").unwrap_err();
        assert!(matches!(err, MarcError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_leader_is_parse_error() {
        let data = "LDR 00714cam a2200205 a 4500\nLDR 00714cam a2200205 a 4500\n\x1d";
        let err = read_all(data).unwrap_err();
        assert!(matches!(err, MarcError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_data_after_terminator_is_parse_error() {
        let err = read_all("001 a\x1d001 b\x1d\n").unwrap_err();
        assert!(matches!(err, MarcError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let mut reader = LexReader::new(Cursor::new(b"245 00$a\xff\xfe\x1d\n".to_vec()));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_unterminated_record_is_incomplete() {
        let err = read_all("245 10$aTitle\x1d\n001 x\n245 10$aOther\x1e\n").unwrap_err();
        match err {
            MarcError::IncompleteRecord { record, line } => {
                assert_eq!(record, 2);
                assert_eq!(line, 3);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader = reader("24 bad\n001 ok\x1d\n");
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(read_all("").unwrap().is_empty());
        assert!(read_all("\n\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_records_read_and_line_number() {
        let mut reader = reader("001 a\x1d\n001 b\x1d\n");
        let source: &mut dyn FormatReader = &mut reader;
        while source.read_record().unwrap().is_some() {}
        assert_eq!(source.records_read(), 2);
        assert_eq!(reader.line_number(), 2);
    }
}
