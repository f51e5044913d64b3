//! Format decoded values for display (indented text tree).

use crate::value::{Record, Value};

/// Format a scalar value; byte blobs are shown as hex.
pub fn format_scalar(v: &Value) -> String {
    match v {
        Value::S8(x) => x.to_string(),
        Value::U8(x) => x.to_string(),
        Value::S16(x) => x.to_string(),
        Value::U16(x) => x.to_string(),
        Value::S24(x) | Value::S32(x) => x.to_string(),
        Value::U24(x) | Value::U32(x) => x.to_string(),
        Value::S64(x) => x.to_string(),
        Value::U64(x) => x.to_string(),
        Value::Half(x) | Value::Float(x) => x.to_string(),
        Value::Double(x) => x.to_string(),
        Value::Bytes(b) => format_hex(b),
        Value::Text(s) => format!("{:?}", s),
        Value::Struct(m) => format!("{{{} fields}}", m.len()),
        Value::List(l) => format!("[{} items]", l.len()),
    }
}

fn format_hex(b: &[u8]) -> String {
    if b.is_empty() {
        return "<empty>".to_string();
    }
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// Format a record as `name: value` lines, nested records indented by two spaces.
pub fn format_record(record: &Record) -> String {
    let mut out = String::new();
    write_record(&mut out, record, 0);
    out
}

fn write_record(out: &mut String, record: &Record, depth: usize) {
    for (name, v) in record {
        write_value(out, name, v, depth);
    }
}

fn write_value(out: &mut String, name: &str, v: &Value, depth: usize) {
    let pad = "  ".repeat(depth);
    match v {
        Value::Struct(m) => {
            out.push_str(&format!("{}{}:\n", pad, name));
            write_record(out, m, depth + 1);
        }
        Value::List(items) => {
            out.push_str(&format!("{}{}:\n", pad, name));
            for (i, item) in items.iter().enumerate() {
                write_value(out, &format!("[{}]", i), item, depth + 1);
            }
        }
        _ => out.push_str(&format!("{}{}: {} ({})\n", pad, name, format_scalar(v), v.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_record_is_indented() {
        let mut header = Record::new();
        header.insert("id".into(), Value::U32(7));
        let mut rec = Record::new();
        rec.insert("header".into(), Value::Struct(header));
        rec.insert("payload".into(), Value::Bytes(vec![0xde, 0xad]));
        assert_eq!(
            format_record(&rec),
            "header:\n  id: 7 (u32)\npayload: de ad (bytes)\n"
        );
    }

    #[test]
    fn list_items_are_numbered() {
        let mut rec = Record::new();
        rec.insert("xs".into(), Value::List(vec![Value::U8(1), Value::Text("a".into())]));
        assert_eq!(format_record(&rec), "xs:\n  [0]: 1 (u8)\n  [1]: \"a\" (text)\n");
    }
}
