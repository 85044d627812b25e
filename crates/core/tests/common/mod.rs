//! Documents assembled byte by byte for the integration tests.
#![allow(dead_code)]

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Objects numbered from 1 in the order they are added.
#[derive(Default)]
pub struct Pdf {
    objects: Vec<Vec<u8>>,
}

impl Pdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object body and returns its number.
    pub fn add(&mut self, body: impl AsRef<[u8]>) -> u32 {
        self.objects.push(body.as_ref().to_vec());
        self.objects.len() as u32
    }

    /// Replaces the body of object `id`.
    pub fn set(&mut self, id: u32, body: impl AsRef<[u8]>) {
        self.objects[id as usize - 1] = body.as_ref().to_vec();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    fn write_objects(&self, out: &mut Vec<u8>, skip: &[u32]) -> Vec<usize> {
        let mut offsets = vec![0; self.objects.len() + 1];
        for (i, body) in self.objects.iter().enumerate() {
            let id = i as u32 + 1;
            if skip.contains(&id) {
                continue;
            }
            offsets[id as usize] = out.len();
            out.extend(format!("{id} 0 obj\n").bytes());
            out.extend(body);
            out.extend(b"\nendobj\n");
        }
        offsets
    }

    /// A classic cross-reference table. `trailer` holds the dictionary
    /// entries besides `/Size`.
    pub fn classic(&self, trailer: &str) -> Vec<u8> {
        let mut out = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let offsets = self.write_objects(&mut out, &[]);
        let xref = out.len();
        out.extend(format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len()).bytes());
        for offset in &offsets[1..] {
            out.extend(format!("{offset:010} 00000 n \n").bytes());
        }
        out.extend(
            format!("trailer\n<< /Size {} {trailer} >>\nstartxref\n{xref}\n%%EOF\n", offsets.len()).bytes(),
        );
        out
    }

    /// A cross-reference stream. Objects listed in `packed` go into one
    /// object stream; the object stream and the xref stream take the next
    /// two numbers.
    pub fn with_xref_stream(&self, root: u32, packed: &[u32]) -> Vec<u8> {
        let mut out = b"%PDF-1.5\n".to_vec();
        let mut offsets = self.write_objects(&mut out, packed);

        let objstm_id = self.objects.len() as u32 + 1;
        let xref_id = objstm_id + 1;
        let mut header = String::new();
        let mut payload = Vec::new();
        for id in packed {
            header.push_str(&format!("{id} {} ", payload.len()));
            payload.extend(&self.objects[*id as usize - 1]);
            payload.push(b'\n');
        }
        let first = header.len();
        let mut objstm_data = header.into_bytes();
        objstm_data.extend(payload);
        let objstm = stream(
            &format!("/Type /ObjStm /N {} /First {first}", packed.len()),
            &objstm_data,
        );
        offsets.push(out.len());
        out.extend(format!("{objstm_id} 0 obj\n").bytes());
        out.extend(&objstm);
        out.extend(b"\nendobj\n");

        let xref_offset = out.len();
        offsets.push(xref_offset);
        let mut rows = Vec::new();
        for (id, offset) in offsets.iter().enumerate() {
            let id = id as u32;
            if id == 0 {
                rows.extend(row(0, 0, 0xFFFF));
            } else if let Some(index) = packed.iter().position(|p| *p == id) {
                rows.extend(row(2, objstm_id, index as u16));
            } else {
                rows.extend(row(1, *offset as u32, 0));
            }
        }
        let xref = stream(
            &format!(
                "/Type /XRef /Size {} /W [1 4 2] /Root {root} 0 R /Filter /FlateDecode",
                offsets.len()
            ),
            &flate(&rows),
        );
        out.extend(format!("{xref_id} 0 obj\n").bytes());
        out.extend(&xref);
        out.extend(format!("\nendobj\nstartxref\n{xref_offset}\n%%EOF\n").bytes());
        out
    }
}

fn row(kind: u8, field1: u32, field2: u16) -> Vec<u8> {
    let mut row = vec![kind];
    row.extend(field1.to_be_bytes());
    row.extend(field2.to_be_bytes());
    row
}

/// Appends an incremental update to `base` that redefines `objects`
/// (`(id, body)` pairs). `trailer` holds entries besides `/Size` and `/Prev`.
pub fn append_update(base: &[u8], objects: &[(u32, &str)], trailer: &str) -> Vec<u8> {
    let prev = previous_startxref(base);
    let mut out = base.to_vec();
    let mut rows = Vec::new();
    for (id, body) in objects {
        rows.push((*id, out.len()));
        out.extend(format!("{id} 0 obj\n{body}\nendobj\n").bytes());
    }
    let size = rows.iter().map(|(id, _)| id + 1).max().unwrap_or(1);
    let xref = out.len();
    out.extend(b"xref\n");
    for (id, offset) in rows {
        out.extend(format!("{id} 1\n{offset:010} 00000 n \n").bytes());
    }
    out.extend(
        format!("trailer\n<< /Size {size} /Prev {prev} {trailer} >>\nstartxref\n{xref}\n%%EOF\n").bytes(),
    );
    out
}

fn previous_startxref(data: &[u8]) -> usize {
    let at = data
        .windows(9)
        .rposition(|w| w == b"startxref")
        .expect("base document has startxref");
    String::from_utf8_lossy(&data[at + 9..])
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .expect("startxref offset")
}

/// A stream object body; `/Length` is filled in.
pub fn stream(extra: &str, data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< /Length {} {extra} >>\nstream\n", data.len()).into_bytes();
    out.extend(data);
    out.extend(b"\nendstream");
    out
}

pub fn flate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory write");
    encoder.finish().expect("in-memory write")
}

/// `<...>` hex string syntax.
pub fn hex(data: &[u8]) -> String {
    format!("<{}>", hex::encode(data))
}

pub const HELVETICA: &str = "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>";
pub const COURIER: &str = "<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>";

/// Catalog 1, page tree 2 (US letter), font 3 as `/F1`, then a page and
/// its content stream for every entry of `contents`.
pub fn text_document(font: &str, contents: &[&str]) -> Pdf {
    let mut pdf = Pdf::new();
    pdf.add("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add("");
    pdf.add(font);
    let mut kids = Vec::new();
    for content in contents {
        let page = pdf.len() as u32 + 1;
        pdf.add(format!(
            "<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page + 1
        ));
        pdf.add(stream("", content.as_bytes()));
        kids.push(format!("{page} 0 R"));
    }
    pdf.set(
        2,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 612 792] >>",
            kids.join(" "),
            kids.len()
        ),
    );
    pdf
}
