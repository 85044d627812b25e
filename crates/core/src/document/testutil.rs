//! Small documents assembled in memory for unit tests.

use super::key::StandardKeyBuilder;
use super::xref::ObjectTable;

/// Lays out `objects` as `1 0 obj`, `2 0 obj`, ... and appends a classic
/// cross-reference table pointing at them.
pub(crate) fn build(objects: &[&str], trailer: &str) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend(format!("{} 0 obj\n{body}\nendobj\n", i + 1).bytes());
    }
    let xref = out.len();
    out.extend(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).bytes());
    for off in offsets {
        out.extend(format!("{off:010} 00000 n \n").bytes());
    }
    out.extend(format!("trailer\n{trailer}\nstartxref\n{xref}\n%%EOF\n").bytes());
    out
}

/// An unfiltered stream object body with `extra` added to its dictionary.
pub(crate) fn stream(extra: &str, data: &str) -> String {
    format!("<< /Length {} {extra} >>\nstream\n{data}\nendstream", data.len())
}

pub(crate) fn table(objects: &[&str]) -> ObjectTable {
    let bytes = build(objects, "<< /Root 1 0 R >>");
    ObjectTable::new(bytes, b"", &StandardKeyBuilder).expect("test document opens")
}
