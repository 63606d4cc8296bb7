use std::io::Cursor;

use item_wheel_core::{ItemId, WheelError};
use item_wheel_dump::{load_tables, parse_item_wheels, parse_wheel_redirects, DumpError};

fn ids(values: &[u8]) -> Vec<ItemId> {
    values
        .iter()
        .map(|value| ItemId::new(*value).expect("valid item"))
        .collect()
}

#[test]
fn parses_wheels_line_by_line() {
    let dump = "00, 01, 01,0A\n03,03\n10\n\n\n";
    let wheels = parse_item_wheels(Cursor::new(dump)).expect("valid dump");

    assert_eq!(wheels.len(), 3);
    assert_eq!(wheels.as_slice()[0].items(), ids(&[0x00, 0x01, 0x01, 0x0a]).as_slice());
    assert_eq!(wheels.as_slice()[1].items(), ids(&[0x03, 0x03]).as_slice());
    assert_eq!(wheels.as_slice()[2].items(), ids(&[0x10]).as_slice());
}

#[test]
fn rejects_items_outside_catalog() {
    let dump = "00,01\n02,13\n";
    let error = parse_item_wheels(Cursor::new(dump)).expect_err("0x13 is not an item");

    match error {
        DumpError::MalformedItemId {
            line,
            entry,
            source: WheelError::MalformedItemId { value },
        } => {
            assert_eq!(line, 2);
            assert_eq!(entry, 2);
            assert_eq!(value, "13");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_empty_entries() {
    let error = parse_item_wheels(Cursor::new("00,,01\n")).expect_err("empty entry");
    assert!(matches!(
        error,
        DumpError::MalformedItemId { line: 1, entry: 2, .. }
    ));
}

#[test]
fn interior_blank_line_in_wheel_dump_is_rejected() {
    let error = parse_item_wheels(Cursor::new("00\n\n01\n")).expect_err("blank line shifts offsets");
    assert!(matches!(error, DumpError::BlankLine { line: 2 }));
}

#[test]
fn interior_blank_line_in_redirect_dump_is_rejected() {
    let error = parse_wheel_redirects(Cursor::new("0\n   \n5\n")).expect_err("blank line shifts indices");
    assert!(matches!(error, DumpError::BlankLine { line: 2 }));
}

#[test]
fn first_of_several_blank_lines_is_reported() {
    let error = parse_wheel_redirects(Cursor::new("0\n1\n\n\n2\n")).expect_err("blank run");
    assert!(matches!(error, DumpError::BlankLine { line: 3 }));
}

#[test]
fn parses_hex_redirects() {
    let dump = "0\n1\n  1f \n0x2A\n\n";
    let redirects = parse_wheel_redirects(Cursor::new(dump)).expect("valid dump");
    assert_eq!(redirects.as_slice(), &[0, 1, 31, 42]);
}

#[test]
fn rejects_non_hex_redirects() {
    let error = parse_wheel_redirects(Cursor::new("0\nzz\n")).expect_err("not hex");
    assert!(matches!(
        error,
        DumpError::MalformedRedirect { line: 2, ref value } if value == "zz"
    ));
}

#[test]
fn missing_files_report_their_path() {
    let error = load_tables("does-not-exist.dmp", "also-missing.dmp").expect_err("missing");
    assert!(matches!(error, DumpError::Open { .. }));
    assert!(error.to_string().contains("does-not-exist.dmp"));
}
