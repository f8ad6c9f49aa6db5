//! Property-based tests for parsing and MARCXML serialization.

mod common;

use common::parse_lex;
use marc2xml::{clean_text, marcxml_to_records, records_to_marcxml};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum LexField {
    Control(String, String),
    Data(String, char, char, Vec<(char, String)>),
}

impl LexField {
    fn to_line(&self) -> String {
        match self {
            LexField::Control(tag, value) => format!("{tag} {value}"),
            LexField::Data(tag, ind1, ind2, subfields) => {
                let mut line = format!("{tag} {ind1}{ind2}");
                for (code, value) in subfields {
                    line.push('$');
                    line.push(*code);
                    line.push_str(value);
                }
                line
            },
        }
    }
}

/// Field text with XML markup characters, inner spaces and non-ASCII letters.
/// `$` and `;` stay out: one splits subfields, the other would close a
/// character reference.
fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9.,&<>\"'éüß]([A-Za-z0-9.,&<>\"'éüß ]{0,10}[A-Za-z0-9.,&<>\"'éüß])?"
}

fn field() -> impl Strategy<Value = LexField> {
    prop_oneof![
        (1u16..10, value()).prop_map(|(n, v)| LexField::Control(format!("{n:03}"), v)),
        (
            10u16..1000,
            "[0-9a-z ]",
            "[0-9a-z ]",
            prop::collection::vec(("[a-z0-9]", value()), 1..4),
        )
            .prop_map(|(n, i1, i2, subfields)| {
                LexField::Data(
                    format!("{n:03}"),
                    i1.chars().next().unwrap_or(' '),
                    i2.chars().next().unwrap_or(' '),
                    subfields
                        .into_iter()
                        .map(|(c, v)| (c.chars().next().unwrap_or('a'), v))
                        .collect(),
                )
            }),
    ]
}

/// Render records as `.lex` text. `own_line` puts each terminator on a line
/// of its own; blank lines between records are allowed.
fn render(records: &[Vec<LexField>], own_line: &[bool], blank_lines: bool) -> String {
    let mut text = String::new();
    for (i, fields) in records.iter().enumerate() {
        let separate = own_line.get(i).copied().unwrap_or(true) || fields.is_empty();
        for (j, field) in fields.iter().enumerate() {
            text.push_str(&field.to_line());
            text.push('\u{1e}');
            if j + 1 == fields.len() && !separate {
                text.push('\u{1d}');
            }
            text.push('\n');
        }
        if separate {
            text.push_str("\u{1d}\n");
        }
        if blank_lines {
            text.push('\n');
        }
    }
    text
}

proptest! {
    #[test]
    fn test_record_count_matches_terminators(
        records in prop::collection::vec(prop::collection::vec(field(), 0..6), 0..8),
        own_line in prop::collection::vec(any::<bool>(), 8),
        blank_lines in any::<bool>(),
    ) {
        let text = render(&records, &own_line, blank_lines);
        let parsed = parse_lex(&text).expect("generated input parses");

        prop_assert_eq!(parsed.len(), text.matches('\u{1d}').count());
        prop_assert_eq!(parsed.len(), records.len());
        for (record, fields) in parsed.iter().zip(&records) {
            prop_assert_eq!(record.len(), fields.len());
        }
    }

    #[test]
    fn test_lex_to_marcxml_roundtrip(
        records in prop::collection::vec(prop::collection::vec(field(), 1..6), 1..5),
    ) {
        let text = render(&records, &[], false);
        let parsed = parse_lex(&text).expect("generated input parses");

        let xml = records_to_marcxml(&parsed).expect("serializes");
        let restored = marcxml_to_records(&xml).expect("reads back");
        prop_assert_eq!(restored, parsed);
    }

    #[test]
    fn test_control_fields_have_no_children(
        fields in prop::collection::vec(field(), 1..6),
    ) {
        let text = render(&[fields], &[], false);
        let parsed = parse_lex(&text).expect("generated input parses");
        let xml = records_to_marcxml(&parsed).expect("serializes");

        for part in xml.split("<controlfield").skip(1) {
            let element = &part[..part.find("</controlfield>").expect("closed")];
            prop_assert!(!element.contains("ind1"));
            prop_assert!(!element.contains("<subfield"));
        }
    }

    #[test]
    fn test_text_without_references_is_kept(v in value()) {
        prop_assert_eq!(clean_text(&v), v.clone());
        // Escaped once, decoded once
        let escaped = quick_xml::escape::escape(v.as_str());
        prop_assert_eq!(clean_text(&escaped), v.clone());
    }

    #[test]
    fn test_single_record_survives_marcxml(fields in prop::collection::vec(field(), 1..8)) {
        let text = render(&[fields], &[true], false);
        let parsed = parse_lex(&text).expect("generated input parses");
        prop_assert_eq!(parsed.len(), 1);

        let xml = records_to_marcxml(&parsed).expect("serializes");
        prop_assert!(!xml.contains("&amp;amp;"));
        let restored = marcxml_to_records(&xml).expect("reads back");
        prop_assert_eq!(restored, parsed);
    }
}
