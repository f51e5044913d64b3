//! Definition syntax tests: parse success/failure, equivalence with built definitions, file loading.

use std::io::Write;

use structbuf::{
    load_definition, parse_definition, Buffer, BufferError, NumberType, ReadDefinition, Value, WriteDefinition,
    WriteField,
};

const HEADER_PAYLOAD: &str = r#"
// 9 bytes in total
header: {
    id: u32;
    flag: u8;
}
payload: 4;
"#;

// ==================== Syntax: valid ====================

#[test]
fn parse_empty_definition() {
    let def = parse_definition("").expect("empty definition parses");
    assert!(def.is_empty());
    let def = parse_definition("  // nothing here\n /* at all */ ").expect("comments only");
    assert!(def.is_empty());
}

#[test]
fn parse_matches_builder() {
    let parsed = parse_definition(HEADER_PAYLOAD).expect("parse");
    let built = WriteDefinition::new()
        .nested(
            "header",
            WriteDefinition::new().number("id", NumberType::U32).number("flag", NumberType::U8),
        )
        .bytes("payload", 4);
    assert_eq!(parsed, built);
    assert_eq!(parsed.byte_len(), 9);
}

#[test]
fn parse_every_type_tag() {
    let src: String = NumberType::ALL
        .iter()
        .map(|t| format!("f_{}: {};\n", t, t))
        .collect();
    let def = parse_definition(&src).expect("parse");
    assert_eq!(def.len(), NumberType::ALL.len());
    for t in NumberType::ALL {
        assert_eq!(def.get(&format!("f_{}", t)), Some(&WriteField::Number(t)));
    }
}

#[test]
fn parse_nested_block_with_trailing_semicolon_and_deep_nesting() {
    let src = "a: { b: { c: s24; }; d: 2; } e: double;";
    let def = parse_definition(src).expect("parse");
    let names: Vec<_> = def.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["a", "e"]);
    match def.get("a") {
        Some(WriteField::Nested(a)) => {
            assert_eq!(a.len(), 2);
            assert!(matches!(a.get("b"), Some(WriteField::Nested(_))));
            assert_eq!(a.get("d"), Some(&WriteField::Bytes(2)));
        }
        other => panic!("expected nested a, got {:?}", other),
    }
    assert_eq!(def.byte_len(), 3 + 2 + 8);
}

// ==================== Syntax: invalid ====================

#[test]
fn unknown_type_tag_is_rejected_at_parse() {
    let err = parse_definition("x: u33;").unwrap_err();
    assert!(matches!(err, BufferError::UnknownType(ref t) if t == "u33"), "{:?}", err);
}

#[test]
fn malformed_sources_are_rejected() {
    for src in ["x u8;", "x: ;", "x: u8", "x: { y: u8;", "1x: u8;", "x: -4;", "x: 0;"] {
        let err = parse_definition(src).unwrap_err();
        assert!(matches!(err, BufferError::Definition(_)), "{}: {:?}", src, err);
    }
}

// ==================== Loading and use ====================

#[test]
fn load_from_file_and_decode() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(HEADER_PAYLOAD.as_bytes()).expect("write");
    let def = load_definition(file.path()).expect("load");

    let mut buf = Buffer::from(vec![7, 0, 0, 0, 1, 9, 9, 9, 9]);
    let rec = buf.read_struct(&ReadDefinition::from(def)).expect("decode");
    let header = rec["header"].as_struct().expect("header");
    assert_eq!(header["id"], Value::U32(7));
    assert_eq!(header["flag"], Value::U8(1));
    assert_eq!(rec["payload"], Value::Bytes(vec![9; 4]));
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_definition(dir.path().join("absent.def")).unwrap_err();
    assert!(matches!(err, BufferError::Io(_)));
}
